use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Responders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Responders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Responders::Name).string().not_null())
                    .col(
                        ColumnDef::new(Responders::OnDuty)
                            .boolean()
                            .default(false)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Responders::Phone).string())
                    .col(ColumnDef::new(Responders::Email).string())
                    .col(
                        ColumnDef::new(Responders::PreferredChannel)
                            .string()
                            .default("both")
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_responders_on_duty")
                    .table(Responders::Table)
                    .col(Responders::OnDuty)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Responders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Responders {
    Table,
    Id,
    Name,
    OnDuty,
    Phone,
    Email,
    PreferredChannel,
}
