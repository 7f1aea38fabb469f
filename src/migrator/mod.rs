use sea_orm_migration::prelude::*;

mod m20260301_000001_create_incidents;
mod m20260301_000002_create_resources;
mod m20260301_000003_create_responders;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_incidents::Migration),
            Box::new(m20260301_000002_create_resources::Migration),
            Box::new(m20260301_000003_create_responders::Migration),
        ]
    }
}
