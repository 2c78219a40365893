pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_schema;
mod m20260105_000002_create_users;
mod m20260105_000003_create_notifications;
mod m20260105_000004_create_analytics_snapshots;
mod m20260106_000001_add_initial_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_schema::Migration),
            Box::new(m20260105_000002_create_users::Migration),
            Box::new(m20260105_000003_create_notifications::Migration),
            Box::new(m20260105_000004_create_analytics_snapshots::Migration),
            Box::new(m20260106_000001_add_initial_user::Migration),
        ]
    }
}
