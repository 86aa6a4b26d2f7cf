//! JSON file storage implementation.

pub mod alarm_repository;
pub mod connection;

pub use alarm_repository::AlarmRepository;
pub use connection::JsonConnection;
