use crate::connection::{Channel, UserId};
use axum::response::sse::Event as SseFrame;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Payload of a single stream frame. Serialized with its `type` tag inline,
/// e.g. `{"type":"heartbeat","timestamp":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    Connected { timestamp: DateTime<Utc> },
    Heartbeat { timestamp: DateTime<Utc> },
    Notification { notification: Value },
    AnalyticsUpdate { data: Value },
}

impl Event {
    pub fn connected() -> Self {
        Event::Connected {
            timestamp: Utc::now(),
        }
    }

    pub fn heartbeat() -> Self {
        Event::Heartbeat {
            timestamp: Utc::now(),
        }
    }

    /// Renders the event as a `data: {json}` frame. No `event:` line is
    /// written; clients dispatch on the `type` field.
    pub fn to_frame(&self) -> Result<SseFrame, serde_json::Error> {
        Ok(SseFrame::default().data(serde_json::to_string(self)?))
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "connected",
            Event::Heartbeat { .. } => "heartbeat",
            Event::Notification { .. } => "notification",
            Event::AnalyticsUpdate { .. } => "analytics-update",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub scope: MessageScope,
}

#[derive(Debug, Clone)]
pub enum MessageScope {
    /// Send to the user's connection on one channel
    User { channel: Channel, user_id: UserId },
}
