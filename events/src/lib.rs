//! Event system for CreatorCompass.
//!
//! Request handlers mutate persistent state and then describe what happened
//! as a [`DomainEvent`]. The [`EventPublisher`] hands that event to every
//! registered [`EventHandler`]; the SSE bridge is the only handler today.
//!
//! This crate has no dependencies on internal crates so that both `domain`
//! and `sse` can depend on it. Entity data travels as serialized JSON.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Matches the entity crate's id type.
pub type Id = Uuid;

/// Business-level changes that a connected client may want to hear about.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A notification row was inserted for `notify_user_id`.
    NotificationCreated {
        /// The serialized notification, sent as-is to the client.
        notification: Value,
        notify_user_id: Id,
    },
    /// A new channel analytics snapshot was recorded.
    AnalyticsUpdated {
        snapshot: Value,
        notify_user_id: Id,
    },
}

impl DomainEvent {
    /// The user this event is addressed to.
    pub fn recipient(&self) -> Id {
        match self {
            DomainEvent::NotificationCreated { notify_user_id, .. }
            | DomainEvent::AnalyticsUpdated { notify_user_id, .. } => *notify_user_id,
        }
    }
}

/// Handlers perform side effects for published events.
/// They must not fail the request that produced the event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers, sequentially and in
/// registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Returns a publisher with `handler` appended. Store the returned value.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
