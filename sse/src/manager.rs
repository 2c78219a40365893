use crate::connection::{Channel, ConnectionId, ConnectionRegistry, Delivery, EventSender, UserId};
use crate::message::{Event, EventType, Message as SseMessage, MessageScope};
use log::*;
use std::time::Duration;

/// Interval between heartbeat frames on an idle stream.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Owns the connection registry for one server instance.
///
/// Built once at startup and shared through application state behind an
/// `Arc`; there is no process-wide singleton.
pub struct Manager {
    registry: ConnectionRegistry,
    heartbeat_interval: Duration,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_heartbeat_interval(DEFAULT_HEARTBEAT_INTERVAL)
    }

    pub fn with_heartbeat_interval(heartbeat_interval: Duration) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            heartbeat_interval,
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Register a new connection and return its unique ID
    pub fn register_connection(
        &self,
        channel: Channel,
        user_id: UserId,
        sender: EventSender,
    ) -> ConnectionId {
        let connection_id = self.registry.register(channel, user_id.clone(), sender);
        info!("Registered {channel} SSE connection {connection_id} for user {user_id}");
        connection_id
    }

    pub fn unregister_connection(
        &self,
        channel: Channel,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) {
        if self.registry.unregister(channel, user_id, connection_id) {
            info!("Unregistered {channel} SSE connection {connection_id} for user {user_id}");
        }
    }

    pub fn is_connected(&self, channel: Channel, user_id: &UserId) -> bool {
        self.registry.is_connected(channel, user_id)
    }

    /// Best-effort delivery to the user's open stream on `channel`.
    /// Events for users without a live stream are dropped.
    pub fn publish(&self, channel: Channel, user_id: &UserId, event: Event) {
        let event_type = event.event_type();

        match self.registry.send_to_user(channel, user_id, event) {
            Delivery::Delivered => {
                debug!("Delivered {event_type} on {channel} to user {user_id}")
            }
            Delivery::NotConnected => {
                trace!("User {user_id} has no {channel} stream, dropping {event_type}")
            }
            Delivery::Evicted => {
                debug!("Dropped {event_type} for user {user_id} after evicting closed {channel} stream")
            }
        }
    }

    /// Send a message based on its scope
    pub fn send_message(&self, message: SseMessage) {
        match message.scope {
            MessageScope::User { channel, user_id } => {
                self.publish(channel, &user_id, message.event);
            }
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
