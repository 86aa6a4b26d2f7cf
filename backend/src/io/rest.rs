//! REST API handlers.

pub mod alarm_apis;

pub use alarm_apis::*;
