//! Server-Sent Events (SSE) delivery for CreatorCompass.
//!
//! Pushes notification and analytics updates from request handlers to the
//! browser tabs of the affected creator.
//!
//! # Architecture
//!
//! - **One stream per user per channel**: the notifications and analytics
//!   endpoints each hold at most one registered connection per user. A new
//!   connection replaces the old one, whose stream then ends.
//! - **Injected manager**: `Manager` is built per server instance and passed
//!   through application state.
//! - **Best effort**: events for users without a live stream are dropped.
//!   There is no replay, retry or cross-process fan-out; clients refetch
//!   on reconnect.
//! - **Heartbeats**: every stream yields a `connected` frame immediately and a
//!   `heartbeat` frame on a fixed interval (30 seconds by default).
//!
//! # Message Flow
//!
//! 1. Client opens `/api/notifications/sse` or `/api/analytics/sse`
//! 2. The web layer authenticates the session and calls [`connection_stream`]
//! 3. A controller mutates state and publishes a `DomainEvent`
//! 4. [`SseDomainEventHandler`] maps it to an [`message::Event`] and the
//!    manager writes it to the recipient's queue if registered
//! 5. The stream yields it and the web layer writes `data: {json}\n\n`
//!
//! # Modules
//!
//! - `connection`: registry keyed by channel and user, `ConnectionId`
//! - `manager`: registration and best-effort publishing
//! - `message`: frame payloads and scopes
//! - `stream`: per-connection producer with heartbeat and cleanup
//! - `domain_event_handler`: bridge from `events::DomainEvent`

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;
pub mod stream;

pub use connection::Channel;
pub use domain_event_handler::SseDomainEventHandler;
pub use manager::Manager;
pub use stream::connection_stream;
