//! Command Router
//!
//! Parses operator console lines into `TeleopCommand` variants and parses the
//! follow-up argument lines each command prompts for.

use super::types::TeleopCommand;
use robot_teleop_core::{CoreError, CoreResult};

/// Main prompt shown before every command
pub const COMMAND_PROMPT: &str = "Enter command ('stand', 'walk', 'twist', 'sit', 'stair', 'stop', 'imu', 'showmsg', 'setfreq') or 'exit' to quit:";

pub const NUMBER_WARNING: &str = "Invalid input, please enter a number.";
pub const INTERVAL_WARNING: &str = "Interval must be > 0.";

/// Stateless command parser for console lines.
pub struct CommandRouter;

impl CommandRouter {
    /// Parse a console line into a TeleopCommand.
    ///
    /// Keywords are matched exactly after trimming surrounding whitespace:
    /// - `stand`, `walk`, `sit`, `stop` -> single request
    /// - `twist` -> Twist (prompts for x, y, z)
    /// - `stair`, `imu` -> toggles (prompt for a flag)
    /// - `showmsg`, `setfreq` -> local telemetry settings
    /// - `exit` -> Exit
    /// - anything else -> Unknown
    pub fn parse(line: &str) -> TeleopCommand {
        match line.trim() {
            "stand" => TeleopCommand::Stand,
            "walk" => TeleopCommand::Walk,
            "sit" => TeleopCommand::Sit,
            "stop" => TeleopCommand::Stop,
            "twist" => TeleopCommand::Twist,
            "stair" => TeleopCommand::Stair,
            "imu" => TeleopCommand::Imu,
            "showmsg" => TeleopCommand::ShowMessages,
            "setfreq" => TeleopCommand::SetFrequency,
            "exit" => TeleopCommand::Exit,
            other => TeleopCommand::Unknown(other.to_string()),
        }
    }
}

/// Lenient flag: true only for "true" in any case, ignoring surrounding
/// whitespace. Everything else, including "yes" and "1", is false.
pub fn parse_enable_flag(input: &str) -> bool {
    input.trim().to_lowercase() == "true"
}

/// Telemetry display switch: true only for "on" in any case.
pub fn parse_show_messages(input: &str) -> bool {
    input.trim().to_lowercase() == "on"
}

/// A finite twist coordinate.
pub fn parse_coordinate(input: &str) -> CoreResult<f64> {
    let text = input.trim();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CoreError::command_argument(format!(
            "Invalid coordinate '{}', please enter a number.",
            text
        ))),
    }
}

/// A positive, finite telemetry interval in seconds.
pub fn parse_interval(input: &str) -> CoreResult<f64> {
    let value = input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
        .ok_or_else(|| CoreError::command_argument(NUMBER_WARNING))?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::command_argument(INTERVAL_WARNING))
    }
}
