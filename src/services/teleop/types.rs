//! Teleop Types
//!
//! Operator commands, session lifecycle, and the events a transport adapter
//! reports to the session.

use robot_teleop_core::{RequestTitle, SessionSnapshot};
use std::fmt;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Command Types
// ---------------------------------------------------------------------------

/// Operator command parsed from one console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeleopCommand {
    /// stand - Request stand mode
    Stand,
    /// walk - Request walk mode
    Walk,
    /// sit - Request sit-down
    Sit,
    /// stop - Request emergency stop
    Stop,
    /// twist - Prompt for x, y, z and send a timed burst of twist requests
    Twist,
    /// stair - Prompt for a flag and toggle stair mode
    Stair,
    /// imu - Prompt for a flag and toggle the IMU
    Imu,
    /// showmsg - Prompt for on/off and toggle telemetry display
    ShowMessages,
    /// setfreq - Prompt for the telemetry display interval
    SetFrequency,
    /// exit - Leave the session
    Exit,
    /// Anything else; ignored
    Unknown(String),
}

impl TeleopCommand {
    /// Title of the single envelope a no-argument command sends.
    pub fn simple_request(&self) -> Option<RequestTitle> {
        match self {
            TeleopCommand::Stand => Some(RequestTitle::StandMode),
            TeleopCommand::Walk => Some(RequestTitle::WalkMode),
            TeleopCommand::Sit => Some(RequestTitle::SitDown),
            TeleopCommand::Stop => Some(RequestTitle::EmergencyStop),
            _ => None,
        }
    }
}

impl fmt::Display for TeleopCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeleopCommand::Stand => write!(f, "stand"),
            TeleopCommand::Walk => write!(f, "walk"),
            TeleopCommand::Sit => write!(f, "sit"),
            TeleopCommand::Stop => write!(f, "stop"),
            TeleopCommand::Twist => write!(f, "twist"),
            TeleopCommand::Stair => write!(f, "stair"),
            TeleopCommand::Imu => write!(f, "imu"),
            TeleopCommand::ShowMessages => write!(f, "showmsg"),
            TeleopCommand::SetFrequency => write!(f, "setfreq"),
            TeleopCommand::Exit => write!(f, "exit"),
            TeleopCommand::Unknown(text) => write!(f, "unknown({})", text),
        }
    }
}

// ---------------------------------------------------------------------------
// Session Types
// ---------------------------------------------------------------------------

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Connecting => write!(f, "connecting"),
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Event reported by a transport adapter, in arrival order
#[derive(Debug)]
pub enum TransportEvent {
    /// Connection established; text sent on `outbound` goes to the device
    Open {
        outbound: mpsc::UnboundedSender<String>,
    },
    /// One inbound text message
    Message(String),
    /// Connection closed by the remote side or failed
    Close { code: Option<u16>, reason: String },
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    /// `exit`, end of input, or interrupt
    Local,
    /// The transport reported a close or failure
    Remote { code: Option<u16>, reason: String },
}

/// How the command interpreter loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterExit {
    ExitCommand,
    InputClosed,
    SessionClosed,
}

/// Counters and final state of a finished session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub cause: CloseCause,
    pub interpreter: Option<InterpreterExit>,
    pub messages_received: u64,
    pub telemetry_displayed: u64,
    pub decode_failures: u64,
    pub final_state: SessionSnapshot,
}
