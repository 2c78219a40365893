use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE creator_compass.platform AS ENUM ('youtube', 'tiktok', 'twitch')",
        )
        .await?;

        db.execute_unprepared("ALTER TYPE creator_compass.platform OWNER TO creator_compass")
            .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS creator_compass.analytics_snapshots (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES creator_compass.users(id) ON DELETE CASCADE,
                platform creator_compass.platform NOT NULL,
                followers BIGINT NOT NULL CHECK (followers >= 0),
                views BIGINT NOT NULL CHECK (views >= 0),
                watch_time_minutes BIGINT NOT NULL DEFAULT 0 CHECK (watch_time_minutes >= 0),
                engagement_rate DOUBLE PRECISION NOT NULL DEFAULT 0
                    CHECK (engagement_rate >= 0 AND engagement_rate <= 1),
                recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            "ALTER TABLE creator_compass.analytics_snapshots OWNER TO creator_compass",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_analytics_snapshots_user_platform_recorded
             ON creator_compass.analytics_snapshots(user_id, platform, recorded_at DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS creator_compass.analytics_snapshots")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS creator_compass.platform")
            .await?;

        Ok(())
    }
}
