//! Per-connection stream producer.
//!
//! A stream moves through `Opening -> Connected -> (Heartbeat)* -> Closed`.
//! Closing is driven from outside: the client aborting the request drops the
//! stream, or a newer registration for the same user drops our sender.

use crate::connection::{Channel, ConnectionId, UserId};
use crate::message::Event;
use crate::Manager;
use async_stream::stream;
use futures::Stream;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Opening,
    Connected,
    Closed,
}

/// Keeps the registry entry alive for exactly as long as the stream exists.
struct Registration {
    manager: Arc<Manager>,
    channel: Channel,
    user_id: UserId,
    connection_id: ConnectionId,
    state: ConnectionState,
}

impl Registration {
    fn transition(&mut self, next: ConnectionState) {
        debug!(
            "{} stream {} for user {}: {:?} -> {:?}",
            self.channel, self.connection_id, self.user_id, self.state, next
        );
        self.state = next;
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.transition(ConnectionState::Closed);
        self.manager
            .unregister_connection(self.channel, &self.user_id, &self.connection_id);
    }
}

/// Registers a connection for `user_id` and returns the events to write to it.
///
/// The first item is always a `connected` event. After that, published events
/// are yielded in the order they were sent, interleaved with a `heartbeat`
/// every `manager.heartbeat_interval()`.
pub fn connection_stream(
    manager: Arc<Manager>,
    channel: Channel,
    user_id: UserId,
) -> impl Stream<Item = Event> + Send + 'static {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection_id = manager.register_connection(channel, user_id.clone(), tx);
    let heartbeat_interval = manager.heartbeat_interval();

    let mut registration = Registration {
        manager,
        channel,
        user_id,
        connection_id,
        state: ConnectionState::Opening,
    };

    stream! {
        registration.transition(ConnectionState::Connected);
        yield Event::connected();

        let mut heartbeat = time::interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let next = tokio::select! {
                received = rx.recv() => received,
                _ = heartbeat.tick() => Some(Event::heartbeat()),
            };

            match next {
                Some(event) => yield event,
                // Sender dropped: a newer connection replaced this one.
                None => break,
            }
        }

        drop(registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;

    fn notification() -> Event {
        Event::Notification {
            notification: json!({ "title": "Your stream starts in 10 minutes" }),
        }
    }

    #[tokio::test]
    async fn first_frame_is_connected() {
        let manager = Arc::new(Manager::new());
        let mut stream = Box::pin(connection_stream(
            manager.clone(),
            Channel::Notifications,
            "u1".to_string(),
        ));

        assert!(manager.is_connected(Channel::Notifications, &"u1".to_string()));
        assert!(matches!(stream.next().await, Some(Event::Connected { .. })));
    }

    #[tokio::test]
    async fn published_event_follows_connected() {
        let manager = Arc::new(Manager::new());
        let user_id = "u1".to_string();
        let mut stream = Box::pin(connection_stream(
            manager.clone(),
            Channel::Notifications,
            user_id.clone(),
        ));
        stream.next().await;

        manager.publish(Channel::Notifications, &user_id, notification());

        assert_eq!(stream.next().await, Some(notification()));
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let manager = Arc::new(Manager::new());
        let user_id = "u1".to_string();
        let mut stream = Box::pin(connection_stream(
            manager.clone(),
            Channel::Analytics,
            user_id.clone(),
        ));
        stream.next().await;

        for views in [1, 2, 3] {
            manager.publish(
                Channel::Analytics,
                &user_id,
                Event::AnalyticsUpdate {
                    data: json!({ "views": views }),
                },
            );
        }

        for views in [1, 2, 3] {
            assert_eq!(
                stream.next().await,
                Some(Event::AnalyticsUpdate {
                    data: json!({ "views": views })
                })
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_is_emitted_after_interval() {
        let manager = Arc::new(Manager::with_heartbeat_interval(Duration::from_secs(30)));
        let mut stream = Box::pin(connection_stream(
            manager,
            Channel::Notifications,
            "u1".to_string(),
        ));
        stream.next().await;

        let started = Instant::now();
        assert!(matches!(stream.next().await, Some(Event::Heartbeat { .. })));
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31));

        assert!(matches!(stream.next().await, Some(Event::Heartbeat { .. })));
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn dropping_the_stream_unregisters() {
        let manager = Arc::new(Manager::new());
        let user_id = "u1".to_string();
        let mut stream = Box::pin(connection_stream(
            manager.clone(),
            Channel::Analytics,
            user_id.clone(),
        ));
        stream.next().await;

        drop(stream);

        assert!(!manager.is_connected(Channel::Analytics, &user_id));
        manager.publish(Channel::Analytics, &user_id, Event::heartbeat());
    }

    #[tokio::test]
    async fn dropping_an_unpolled_stream_unregisters() {
        let manager = Arc::new(Manager::new());
        let user_id = "u1".to_string();
        let stream = connection_stream(manager.clone(), Channel::Analytics, user_id.clone());

        drop(stream);

        assert!(!manager.is_connected(Channel::Analytics, &user_id));
    }

    #[tokio::test]
    async fn replacement_stream_takes_over_and_first_ends() {
        let manager = Arc::new(Manager::new());
        let user_id = "u1".to_string();

        let mut first = Box::pin(connection_stream(
            manager.clone(),
            Channel::Notifications,
            user_id.clone(),
        ));
        first.next().await;

        let mut second = Box::pin(connection_stream(
            manager.clone(),
            Channel::Notifications,
            user_id.clone(),
        ));
        second.next().await;

        assert_eq!(first.next().await, None);
        drop(first);

        // The orphaned stream's cleanup must not remove its replacement.
        assert!(manager.is_connected(Channel::Notifications, &user_id));

        manager.publish(Channel::Notifications, &user_id, notification());
        assert_eq!(second.next().await, Some(notification()));
    }
}
