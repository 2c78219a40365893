//! Business operations for CreatorCompass.
//!
//! Consumers depend on `domain` alone; entity types and the event system are
//! re-exported from here so `web` never reaches into `entity_api` directly.

pub use entity_api::{
    analytics_snapshots, notification_kind, notifications, platform, users, Id,
};
pub use events;

pub mod analytics;
pub mod error;
pub mod notification;
pub mod user;
