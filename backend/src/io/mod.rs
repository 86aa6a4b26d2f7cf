//! IO layer: the interface exposed to UI clients.

pub mod rest;

pub use rest::*;
