//! Robot Teleop - interactive console for a WebSocket-connected robot
//!
//! This library provides the client side of the teleoperation session.
//! It includes:
//! - Command interpreter and telemetry dispatch
//! - WebSocket transport adapter
//! - Configuration loading and command line overrides
//! - Console and tracing setup

pub mod cli;
pub mod client;
pub mod console;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use client::{run_client, run_with_adapter, session_state};
pub use console::Console;
pub use models::settings::{ClientConfig, ConfigOverrides};
pub use services::teleop::{CloseCause, InterpreterExit, SessionSummary};
pub use storage::ConfigService;
pub use utils::error::{AppError, AppResult};
