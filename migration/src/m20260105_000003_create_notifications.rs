use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE creator_compass.notification_kind AS ENUM \
             ('system', 'milestone', 'mentorship', 'community', 'event_reminder')",
        )
        .await?;

        db.execute_unprepared(
            "ALTER TYPE creator_compass.notification_kind OWNER TO creator_compass",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS creator_compass.notifications (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES creator_compass.users(id) ON DELETE CASCADE,
                kind creator_compass.notification_kind NOT NULL DEFAULT 'system',
                title VARCHAR(255) NOT NULL,
                message TEXT NOT NULL,
                link VARCHAR(2048),
                read BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            "ALTER TABLE creator_compass.notifications OWNER TO creator_compass",
        )
        .await?;

        // Inbox listing and unread badge both filter on (user_id, read)
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_notifications_user_read_created
             ON creator_compass.notifications(user_id, read, created_at DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS creator_compass.notifications")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS creator_compass.notification_kind")
            .await?;

        Ok(())
    }
}
