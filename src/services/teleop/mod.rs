//! Robot Teleoperation
//!
//! Interactive control of one robot over a persistent socket. Operator lines
//! become request envelopes; inbound telemetry is decoded, used to learn the
//! device identifier, and displayed subject to the throttle.
//!
//! ## Architecture
//!
//! ```text
//! stdin thread → mpsc → CommandInterpreter → CommandRouter.parse()
//!                                  ↓
//!                            Outbox.send() → TeleopAdapter (WebSocket)
//!                                                  ↓
//!             ConnectionSession ← mpsc ← TransportEvent (Open/Message/Close)
//!                     ↓
//!        SessionState (device id, throttle) → Console
//! ```

pub mod adapters;
pub mod command_router;
pub mod interpreter;
pub mod outbox;
pub mod session;
pub mod types;

pub use types::*;
