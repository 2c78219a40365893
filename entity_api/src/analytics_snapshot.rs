use super::error::Error;
use chrono::Utc;
use entity::analytics_snapshots::{ActiveModel, Column, Entity, Model};
use entity::platform::Platform;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

/// Stores a snapshot for `user_id`, stamped with the current time.
pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    snapshot_model: Model,
) -> Result<Model, Error> {
    debug!(
        "New {} analytics snapshot for user {user_id}: followers={}, views={}",
        snapshot_model.platform, snapshot_model.followers, snapshot_model.views
    );

    let now = Utc::now();

    let active_model: ActiveModel = ActiveModel {
        user_id: Set(user_id),
        platform: Set(snapshot_model.platform),
        followers: Set(snapshot_model.followers),
        views: Set(snapshot_model.views),
        watch_time_minutes: Set(snapshot_model.watch_time_minutes),
        engagement_rate: Set(snapshot_model.engagement_rate),
        recorded_at: Set(now.into()),
        created_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Most recent snapshots first, optionally restricted to one platform.
pub async fn find_by_user(
    db: &impl ConnectionTrait,
    user_id: Id,
    platform: Option<Platform>,
    limit: Option<u64>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::UserId.eq(user_id));

    if let Some(platform) = platform {
        query = query.filter(Column::Platform.eq(platform));
    }

    Ok(query
        .order_by_desc(Column::RecordedAt)
        .limit(limit)
        .all(db)
        .await?)
}
