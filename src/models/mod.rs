//! Data Models
//!
//! Configuration structures for the client.

pub mod settings;

pub use settings::{ClientConfig, ConfigOverrides, TelemetrySettings, TwistSettings};
