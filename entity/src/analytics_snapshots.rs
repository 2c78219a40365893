//! Point-in-time channel statistics reported for one platform.

use crate::platform::Platform;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::analytics_snapshots::Model)]
#[sea_orm(schema_name = "creator_compass", table_name = "analytics_snapshots")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,
    pub platform: Platform,
    pub followers: i64,
    pub views: i64,
    #[serde(default)]
    pub watch_time_minutes: i64,
    /// Interactions per view, as a fraction between 0 and 1.
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub recorded_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
