//! HTTP side of the realtime streams.
//!
//! Registry, stream producer and frame types live in the `sse` crate; this
//! module only turns an authenticated request into a streaming response.

pub(crate) mod handler;
