use crate::error::Error;
use crate::notifications::Model;
use crate::Id;
use entity_api::{notification, user};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::notification::find_by_id;

/// Longest title a client can render in the notification tray.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Persists a notification and pushes it to the recipient's open
/// notification stream, if there is one. An unknown recipient is a not-found
/// error.
pub async fn create(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    notification_model: Model,
) -> Result<Model, Error> {
    validate(&notification_model)?;

    user::find_by_id(db, notification_model.user_id).await?;

    let notification = notification::create(db, notification_model).await?;

    publish_created(event_publisher, &notification).await;

    Ok(notification)
}

/// Marks one of `user_id`'s notifications as read.
pub async fn mark_read(db: &DatabaseConnection, user_id: Id, id: Id) -> Result<Model, Error> {
    let existing = notification::find_by_id(db, id).await?;

    if existing.user_id != user_id {
        warn!("User {user_id} attempted to mark notification {id} they do not own");
        return Err(Error::forbidden());
    }

    Ok(notification::mark_read(db, id).await?)
}

pub async fn mark_all_read(db: &DatabaseConnection, user_id: Id) -> Result<u64, Error> {
    Ok(notification::mark_all_read(db, user_id).await?)
}

pub async fn find_by_user(
    db: &DatabaseConnection,
    user_id: Id,
    unread_only: bool,
) -> Result<Vec<Model>, Error> {
    Ok(notification::find_by_user(db, user_id, unread_only).await?)
}

pub async fn unread_count(db: &DatabaseConnection, user_id: Id) -> Result<u64, Error> {
    Ok(notification::unread_count(db, user_id).await?)
}

fn validate(model: &Model) -> Result<(), Error> {
    let title = model.title.trim();
    if title.is_empty() {
        return Err(Error::invalid("notification title is empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::invalid("notification title is too long"));
    }
    if model.message.trim().is_empty() {
        return Err(Error::invalid("notification message is empty"));
    }
    Ok(())
}

// Delivery is best-effort: the row is already committed, so a serialization
// failure is logged and the request still succeeds.
pub(crate) async fn publish_created(event_publisher: &EventPublisher, notification: &Model) {
    match serde_json::to_value(notification) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::NotificationCreated {
                    notification: value,
                    notify_user_id: notification.user_id,
                })
                .await;
        }
        Err(err) => {
            error!(
                "Failed to serialize notification {} for delivery: {err}",
                notification.id
            );
        }
    }
}
