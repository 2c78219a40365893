use crate::connection::Channel;
use crate::message::{Event as SseEvent, Message as SseMessage, MessageScope};
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to SSE messages and routing them
/// to the recipient's stream on the matching channel.
///
/// The domain layer decides who is notified; this handler only routes.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let (channel, sse_event) = match event {
            DomainEvent::NotificationCreated { notification, .. } => (
                Channel::Notifications,
                SseEvent::Notification {
                    notification: notification.clone(),
                },
            ),
            DomainEvent::AnalyticsUpdated { snapshot, .. } => (
                Channel::Analytics,
                SseEvent::AnalyticsUpdate {
                    data: snapshot.clone(),
                },
            ),
        };

        let user_id = event.recipient().to_string();
        debug!("Routing domain event to {channel} stream of user {user_id}");

        self.sse_manager.send_message(SseMessage {
            event: sse_event,
            scope: MessageScope::User { channel, user_id },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{EventPublisher, Id};
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn notification_created_reaches_notifications_channel() {
        let manager = Arc::new(Manager::new());
        let user_id = Id::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Notifications, user_id.to_string(), tx);

        let publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(manager.clone())));
        publisher
            .publish(DomainEvent::NotificationCreated {
                notification: json!({ "title": "New mentor match" }),
                notify_user_id: user_id,
            })
            .await;

        assert_eq!(
            rx.try_recv().unwrap(),
            SseEvent::Notification {
                notification: json!({ "title": "New mentor match" })
            }
        );
    }

    #[tokio::test]
    async fn analytics_updated_skips_notifications_channel() {
        let manager = Arc::new(Manager::new());
        let user_id = Id::new_v4();
        let (notifications_tx, mut notifications_rx) = mpsc::unbounded_channel();
        let (analytics_tx, mut analytics_rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Notifications, user_id.to_string(), notifications_tx);
        manager.register_connection(Channel::Analytics, user_id.to_string(), analytics_tx);

        SseDomainEventHandler::new(manager)
            .handle(&DomainEvent::AnalyticsUpdated {
                snapshot: json!({ "platform": "twitch", "followers": 88 }),
                notify_user_id: user_id,
            })
            .await;

        assert!(notifications_rx.try_recv().is_err());
        assert_eq!(
            analytics_rx.try_recv().unwrap(),
            SseEvent::AnalyticsUpdate {
                data: json!({ "platform": "twitch", "followers": 88 })
            }
        );
    }

    #[tokio::test]
    async fn offline_recipient_is_ignored() {
        let manager = Arc::new(Manager::new());
        SseDomainEventHandler::new(manager)
            .handle(&DomainEvent::NotificationCreated {
                notification: json!({}),
                notify_user_id: Id::new_v4(),
            })
            .await;
    }
}
