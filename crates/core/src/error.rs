//! Core Error Types
//!
//! Defines the error kinds of the teleop protocol core. Every variant is
//! recovered locally by its caller; none of them is fatal to the process.

use thiserror::Error;

/// Core error type for the Robot Teleop workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Payload could not be represented as an envelope `data` object
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Inbound text is not a conforming envelope
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Operator supplied an unusable command argument
    #[error("Invalid argument: {0}")]
    CommandArgument(String),

    /// Send attempted without an open session, or the session went away
    #[error("Transport error: {0}")]
    Transport(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a decoding error
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Create a command argument error
    pub fn command_argument(msg: impl Into<String>) -> Self {
        Self::CommandArgument(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
