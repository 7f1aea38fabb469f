use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incidents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incidents::Severity).string().not_null())
                    .col(ColumnDef::new(Incidents::Address).string().not_null())
                    .col(ColumnDef::new(Incidents::Latitude).double())
                    .col(ColumnDef::new(Incidents::Longitude).double())
                    .col(ColumnDef::new(Incidents::Description).text().not_null())
                    .col(
                        ColumnDef::new(Incidents::Status)
                            .string()
                            .default("reported")
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incidents::PriorityScore).small_integer())
                    .col(
                        ColumnDef::new(Incidents::EscalationStatus)
                            .string()
                            .default("normal")
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incidents::Recommendations)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incidents::AssignedResources)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incidents::ContactedResponders)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incidents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incidents::LastActionAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // The escalation scan filters on lifecycle status every sweep.
        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_status")
                    .table(Incidents::Table)
                    .col(Incidents::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    Severity,
    Address,
    Latitude,
    Longitude,
    Description,
    Status,
    PriorityScore,
    EscalationStatus,
    Recommendations,
    AssignedResources,
    ContactedResponders,
    CreatedAt,
    LastActionAt,
}
