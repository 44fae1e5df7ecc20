//! Robot Teleop Core
//!
//! Protocol core for the Robot Teleop client: the wire envelope, the telemetry
//! throttle, and the session state shared between the command interpreter and
//! the inbound dispatch path. This crate has no async runtime dependency and
//! knows nothing about sockets or the console.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `envelope` - Request/telemetry envelope, command vocabulary, encode/decode
//! - `throttle` - Rate limiting for displayed telemetry
//! - `state` - Synchronized session state (`SessionState`, `DeviceIdPolicy`)
//!
//! ## Design Principles
//!
//! 1. **Only serde/thiserror/uuid/chrono** - no async runtime, no I/O
//! 2. **Explicit clocks** - throttle decisions take `now` so they can be tested
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod envelope;
pub mod error;
pub mod state;
pub mod throttle;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Envelope Codec ─────────────────────────────────────────────────────
pub use envelope::{EnablePayload, Envelope, RequestTitle, TwistPayload};

// ── Session State ──────────────────────────────────────────────────────
pub use state::{DeviceIdPolicy, SessionSnapshot, SessionState};
pub use throttle::TelemetryThrottle;
