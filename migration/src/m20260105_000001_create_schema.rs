use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS creator_compass;")
            .await?;
        db.execute_unprepared("SET search_path TO creator_compass, public;")
            .await?;

        // The application role owns everything created in the schema
        db.execute_unprepared(
            r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE creator_compass TO creator_compass;
                    GRANT ALL ON SCHEMA creator_compass TO creator_compass;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA creator_compass GRANT ALL ON TABLES TO creator_compass;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA creator_compass GRANT ALL ON SEQUENCES TO creator_compass;
                END $$;
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA creator_compass REVOKE ALL ON SEQUENCES FROM creator_compass;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA creator_compass REVOKE ALL ON TABLES FROM creator_compass;
                    REVOKE ALL ON SCHEMA creator_compass FROM creator_compass;
                    REVOKE ALL PRIVILEGES ON DATABASE creator_compass FROM creator_compass;
                END $$;
            "#,
        )
        .await?;

        db.execute_unprepared("DROP SCHEMA IF EXISTS creator_compass CASCADE;")
            .await?;

        Ok(())
    }
}
