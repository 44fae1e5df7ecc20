//! Storage Layer
//!
//! Loading of on-disk client configuration.

pub mod config;

pub use config::{ConfigService, ConfigSource};
