//! Typed query parameters for endpoint inputs.
//!
//! Deserializing into these structs validates the query string by type before
//! any handler logic runs; a bad value is rejected with a 400 by axum.

pub(crate) mod analytics;
pub(crate) mod notification;
