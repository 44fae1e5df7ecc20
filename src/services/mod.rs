//! Services
//!
//! Session logic for the teleoperation client.

pub mod teleop;
