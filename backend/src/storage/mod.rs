//! Storage layer: durable persistence for the alarm list.
//!
//! The store is a single human-editable JSON document in a per-user
//! directory; see [`json`] for the implementation.

pub mod json;

pub use json::{AlarmRepository, JsonConnection};
