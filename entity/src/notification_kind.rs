use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
pub enum NotificationKind {
    #[sea_orm(string_value = "system")]
    #[default]
    System,
    #[sea_orm(string_value = "milestone")]
    Milestone,
    #[sea_orm(string_value = "mentorship")]
    Mentorship,
    #[sea_orm(string_value = "community")]
    Community,
    #[sea_orm(string_value = "event_reminder")]
    EventReminder,
}
