use password_auth::generate_hash;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement, Value};

#[derive(DeriveMigrationName)]
pub struct Migration;

const INITIAL_USER_EMAIL: &str = "admin@creatorcompass.io";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let now = chrono::Utc::now();

        // Raw SQL so later entity changes can't break this migration.
        db.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                INSERT INTO creator_compass.users (
                    email, first_name, last_name, display_name, password, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (email) DO NOTHING
            "#,
            vec![
                Value::String(Some(Box::new(INITIAL_USER_EMAIL.to_owned()))),
                Value::String(Some(Box::new("Admin".to_owned()))),
                Value::String(Some(Box::new("Compass".to_owned()))),
                Value::String(Some(Box::new("Admin".to_owned()))),
                Value::String(Some(Box::new(generate_hash("password")))),
                Value::ChronoDateTimeUtc(Some(Box::new(now))),
                Value::ChronoDateTimeUtc(Some(Box::new(now))),
            ],
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "DELETE FROM creator_compass.users WHERE email = $1",
                vec![Value::String(Some(Box::new(INITIAL_USER_EMAIL.to_owned())))],
            ))
            .await?;

        Ok(())
    }
}
