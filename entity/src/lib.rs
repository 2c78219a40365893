use uuid::Uuid;

pub mod analytics_snapshots;
pub mod notification_kind;
pub mod notifications;
pub mod platform;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
