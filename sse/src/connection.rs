use crate::message::Event;
use dashmap::DashMap;
use log::*;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

// Type alias for user IDs (web layer converts domain::Id to String)
pub type UserId = String;

/// Sending half of a connection's event queue.
pub type EventSender = UnboundedSender<Event>;

/// Feature area a stream belongs to. Each area has its own endpoint and its
/// own registry slot per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Notifications,
    Analytics,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Notifications => "notifications",
            Channel::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub sender: EventSender,
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Nobody is registered for this user on this channel.
    NotConnected,
    /// The registered handle was closed; it has been removed and the event dropped.
    Evicted,
}

/// Process-local registry holding at most one live connection per user per channel.
pub struct ConnectionRegistry {
    connections: DashMap<(Channel, UserId), ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Registers `sender` for the user, replacing whatever was there before.
    ///
    /// The replaced entry's sender is dropped here, which ends the orphaned
    /// stream once it drains.
    pub fn register(&self, channel: Channel, user_id: UserId, sender: EventSender) -> ConnectionId {
        let connection_id = ConnectionId::new();

        let previous = self.connections.insert(
            (channel, user_id.clone()),
            ConnectionInfo {
                connection_id: connection_id.clone(),
                sender,
            },
        );

        if let Some(previous) = previous {
            debug!(
                "Connection {} replaced {} on {channel} for user {user_id}",
                connection_id, previous.connection_id
            );
        }

        connection_id
    }

    /// Removes the user's entry if it still belongs to `connection_id`.
    ///
    /// Returns whether an entry was removed. A connection that has already
    /// been replaced leaves its successor untouched.
    pub fn unregister(
        &self,
        channel: Channel,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> bool {
        self.connections
            .remove_if(&(channel, user_id.clone()), |_, info| {
                &info.connection_id == connection_id
            })
            .is_some()
    }

    pub fn is_connected(&self, channel: Channel, user_id: &UserId) -> bool {
        self.connections.contains_key(&(channel, user_id.clone()))
    }

    /// Attempts to hand `event` to the user's connection on `channel`.
    pub fn send_to_user(&self, channel: Channel, user_id: &UserId, event: Event) -> Delivery {
        let key = (channel, user_id.clone());

        // The map guard must be released before removing a failed entry.
        let failed_connection = match self.connections.get(&key) {
            None => return Delivery::NotConnected,
            Some(info) => match info.sender.send(event) {
                Ok(()) => return Delivery::Delivered,
                Err(_) => info.connection_id.clone(),
            },
        };

        self.connections
            .remove_if(&key, |_, info| info.connection_id == failed_connection);

        warn!(
            "Failed to send event to connection {failed_connection} on {channel} for user {user_id}. Connection evicted."
        );

        Delivery::Evicted
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn notification(title: &str) -> Event {
        Event::Notification {
            notification: json!({ "title": title }),
        }
    }

    #[test]
    fn send_to_unregistered_user_is_not_connected() {
        let registry = ConnectionRegistry::new();
        let delivery = registry.send_to_user(
            Channel::Notifications,
            &"nobody".to_string(),
            notification("ignored"),
        );
        assert_eq!(delivery, Delivery::NotConnected);
    }

    #[test]
    fn registered_handle_receives_exactly_one_event() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let user_id = "creator-1".to_string();
        registry.register(Channel::Notifications, user_id.clone(), tx);

        let delivery =
            registry.send_to_user(Channel::Notifications, &user_id, notification("hello"));

        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(rx.try_recv().unwrap(), notification("hello"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channels_are_independent() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let user_id = "creator-1".to_string();
        registry.register(Channel::Analytics, user_id.clone(), tx);

        let delivery =
            registry.send_to_user(Channel::Notifications, &user_id, notification("hello"));

        assert_eq!(delivery, Delivery::NotConnected);
        assert!(rx.try_recv().is_err());
        assert!(registry.is_connected(Channel::Analytics, &user_id));
        assert!(!registry.is_connected(Channel::Notifications, &user_id));
    }

    #[test]
    fn second_registration_takes_over_and_closes_the_first() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let user_id = "creator-1".to_string();

        registry.register(Channel::Notifications, user_id.clone(), tx1);
        registry.register(Channel::Notifications, user_id.clone(), tx2);

        registry.send_to_user(Channel::Notifications, &user_id, notification("second"));

        assert_eq!(rx2.try_recv().unwrap(), notification("second"));
        assert_eq!(
            rx1.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn stale_unregister_keeps_the_replacement() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let user_id = "creator-1".to_string();

        let first = registry.register(Channel::Notifications, user_id.clone(), tx1);
        let second = registry.register(Channel::Notifications, user_id.clone(), tx2);

        assert!(!registry.unregister(Channel::Notifications, &user_id, &first));
        assert!(registry.is_connected(Channel::Notifications, &user_id));

        assert!(registry.unregister(Channel::Notifications, &user_id, &second));
        assert!(!registry.is_connected(Channel::Notifications, &user_id));
    }

    #[test]
    fn closed_handle_is_evicted_on_next_send() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let user_id = "creator-1".to_string();
        registry.register(Channel::Analytics, user_id.clone(), tx);
        drop(rx);

        let event = Event::AnalyticsUpdate {
            data: json!({ "followers": 10 }),
        };
        assert_eq!(
            registry.send_to_user(Channel::Analytics, &user_id, event.clone()),
            Delivery::Evicted
        );
        assert!(!registry.is_connected(Channel::Analytics, &user_id));
        assert_eq!(
            registry.send_to_user(Channel::Analytics, &user_id, event),
            Delivery::NotConnected
        );
    }
}
