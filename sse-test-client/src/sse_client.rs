use anyhow::Result;
use eventsource_client::{self as es, Client, ReconnectOptions};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The two stream endpoints exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Notifications,
    Analytics,
}

impl Channel {
    fn path(&self) -> &'static str {
        match self {
            Channel::Notifications => "/api/notifications/sse",
            Channel::Analytics => "/api/analytics/sse",
        }
    }
}

/// A decoded `data:` frame. The backend never writes an `event:` line, so
/// the type comes from the JSON `type` field.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub data: Value,
    pub received_at: Instant,
}

impl Event {
    fn from_data(data: &str) -> Option<Self> {
        let data: Value = serde_json::from_str(data).ok()?;
        let event_type = data.get("type")?.as_str()?.to_string();
        Some(Self {
            event_type,
            data,
            received_at: Instant::now(),
        })
    }
}

pub struct Connection {
    pub label: String,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    /// Opens a stream without automatic reconnection, so a server-side close
    /// is observable through [`Connection::wait_for_close`].
    pub async fn establish(
        base_url: &str,
        channel: Channel,
        session_cookie: &str,
        label: String,
    ) -> Result<Self> {
        let url = format!("{base_url}{}", channel.path());
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?
            .header("Cookie", &format!("id={session_cookie}"))?
            .reconnect(ReconnectOptions::reconnect(false).build())
            .build();

        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => match Event::from_data(&event.data) {
                        Some(decoded) => {
                            trace!("{task_label} <- {}", decoded.event_type);
                            if tx.send(decoded).is_err() {
                                debug!("Event receiver dropped for {task_label}");
                                break;
                            }
                        }
                        None => warn!("Undecodable frame for {task_label}: {}", event.data),
                    },
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Stream for {task_label} ended: {e:?}");
                        break;
                    }
                    None => {
                        debug!("Stream for {task_label} ended");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            label,
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Waits for the next event of `event_type`, skipping anything else
    /// (heartbeats in particular).
    pub async fn wait_for_event(&mut self, event_type: &str, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("{}: timeout waiting for {event_type}", self.label);
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type == event_type => return Ok(event),
                Ok(Some(_)) => continue,
                Ok(None) => anyhow::bail!("{}: stream closed", self.label),
                Err(_) => anyhow::bail!("{}: timeout waiting for {event_type}", self.label),
            }
        }
    }

    /// Succeeds if no `event_type` event arrives within `window`.
    pub async fn expect_no_event(&mut self, event_type: &str, window: Duration) -> Result<()> {
        match self.wait_for_event(event_type, window).await {
            Ok(event) => anyhow::bail!(
                "{}: unexpected {event_type} event: {}",
                self.label,
                event.data
            ),
            Err(_) => Ok(()),
        }
    }

    /// Succeeds once the server ends the stream.
    pub async fn wait_for_close(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => return Ok(()),
                Err(_) => anyhow::bail!("{}: stream still open", self.label),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_type_from_payload() {
        let event = Event::from_data(r#"{"type":"analytics-update","data":{"followers":10}}"#)
            .unwrap();
        assert_eq!(event.event_type, "analytics-update");
        assert_eq!(event.data["data"]["followers"], 10);
    }

    #[test]
    fn ignores_frames_without_type() {
        assert!(Event::from_data(r#"{"followers":10}"#).is_none());
        assert!(Event::from_data("not json").is_none());
    }
}
