//! Command Interpreter
//!
//! Read-evaluate loop over operator lines. Each recognized command is turned
//! into zero or more envelopes handed to the [`Outbox`]. Argument errors are
//! reported on the console and the loop carries on; nothing a command does
//! ends the loop except `exit`, end of input, or the session closing.

use std::sync::Arc;

use robot_teleop_core::envelope::{self, EnablePayload, RequestTitle, TwistPayload};
use robot_teleop_core::{CoreError, CoreResult, SessionState};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::command_router::{
    parse_coordinate, parse_enable_flag, parse_interval, parse_show_messages, CommandRouter,
    COMMAND_PROMPT,
};
use super::outbox::Outbox;
use super::types::{InterpreterExit, TeleopCommand};
use crate::console::Console;
use crate::models::settings::TwistSettings;

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
    InputEnded,
}

pub struct CommandInterpreter {
    input: mpsc::Receiver<String>,
    state: Arc<SessionState>,
    outbox: Outbox,
    console: Console,
    twist: TwistSettings,
    shutdown: CancellationToken,
}

impl CommandInterpreter {
    pub fn new(
        input: mpsc::Receiver<String>,
        state: Arc<SessionState>,
        outbox: Outbox,
        console: Console,
        twist: TwistSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            input,
            state,
            outbox,
            console,
            twist,
            shutdown,
        }
    }

    /// Run until `exit`, end of input, or session shutdown.
    ///
    /// `exit` and end of input set the exit flag and cancel `shutdown` so the
    /// session closes too.
    pub async fn run(mut self) -> InterpreterExit {
        while !self.state.exit_requested() {
            self.console.line(COMMAND_PROMPT);
            let Some(line) = self.read_line().await else {
                return self.input_ended();
            };

            let command = CommandRouter::parse(&line);
            debug!(command = %command, "operator command");

            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    self.request_exit();
                    return InterpreterExit::ExitCommand;
                }
                Ok(Flow::InputEnded) => return self.input_ended(),
                Err(CoreError::CommandArgument(warning)) => self.console.line(warning),
                Err(e) => error!("command failed: {}", e),
            }

            if self.shutdown.is_cancelled() {
                return InterpreterExit::SessionClosed;
            }
        }
        InterpreterExit::ExitCommand
    }

    async fn execute(&mut self, command: TeleopCommand) -> CoreResult<Flow> {
        if let Some(title) = command.simple_request() {
            self.emit(title, &())?;
            return Ok(Flow::Continue);
        }

        match command {
            TeleopCommand::Twist => {
                let mut coordinates = [0.0; 3];
                for (axis, value) in ["x", "y", "z"].iter().zip(coordinates.iter_mut()) {
                    let Some(line) = self.ask(&format!("Enter {} value:", axis)).await else {
                        return Ok(Flow::InputEnded);
                    };
                    *value = parse_coordinate(&line)?;
                }
                let [x, y, z] = coordinates;
                self.twist_burst(TwistPayload { x, y, z }).await?;
            }
            TeleopCommand::Stair => {
                let Some(line) = self.ask("Enable stair mode (true/false):").await else {
                    return Ok(Flow::InputEnded);
                };
                let enable = parse_enable_flag(&line);
                self.emit(RequestTitle::StairMode, &EnablePayload { enable })?;
            }
            TeleopCommand::Imu => {
                let Some(line) = self.ask("Enable IMU (true/false):").await else {
                    return Ok(Flow::InputEnded);
                };
                let enable = parse_enable_flag(&line);
                self.emit(RequestTitle::EnableImu, &EnablePayload { enable })?;
            }
            TeleopCommand::ShowMessages => {
                let Some(line) = self.ask("Show messages? (on/off): ").await else {
                    return Ok(Flow::InputEnded);
                };
                let visible = parse_show_messages(&line);
                self.state.set_telemetry_visible(visible);
                if visible {
                    self.console.line("Message display enabled.");
                } else {
                    self.console.line("Message display disabled.");
                }
            }
            TeleopCommand::SetFrequency => {
                let Some(line) = self.ask("Enter print interval in seconds: ").await else {
                    return Ok(Flow::InputEnded);
                };
                let interval_secs = parse_interval(&line)?;
                self.state
                    .set_telemetry_interval(interval_secs)
                    .map_err(|e| CoreError::command_argument(e.to_string()))?;
                self.console.line(format!(
                    "Message print interval set to {} seconds.",
                    interval_secs
                ));
            }
            TeleopCommand::Exit => return Ok(Flow::Exit),
            TeleopCommand::Unknown(text) => {
                debug!("ignoring unrecognized command '{}'", text);
            }
            TeleopCommand::Stand | TeleopCommand::Walk | TeleopCommand::Sit | TeleopCommand::Stop => {}
        }
        Ok(Flow::Continue)
    }

    /// Send `repeat` identical twist requests at `rate_hz`, then wait one more
    /// period so back-to-back bursts stay evenly spaced. A started burst always
    /// completes, even if exit is requested meanwhile.
    async fn twist_burst(&self, payload: TwistPayload) -> CoreResult<()> {
        let mut ticker = interval(self.twist.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for _ in 0..self.twist.repeat {
            ticker.tick().await;
            self.emit(RequestTitle::Twist, &payload)?;
        }
        ticker.tick().await;
        Ok(())
    }

    /// Encode one envelope addressed to the current device id and send it.
    /// A send without an open session is dropped.
    fn emit<P>(&self, title: RequestTitle, payload: &P) -> CoreResult<()>
    where
        P: Serialize + ?Sized,
    {
        let device_id = self.state.device_id();
        let wire = envelope::encode(device_id.as_deref(), title.as_str(), payload)?;
        if let Err(e) = self.outbox.send(wire) {
            debug!(title = %title, "send dropped: {}", e);
        }
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Option<String> {
        self.console.prompt(prompt);
        self.read_line().await
    }

    async fn read_line(&mut self) -> Option<String> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            line = self.input.recv() => line,
        }
    }

    fn input_ended(&self) -> InterpreterExit {
        if self.shutdown.is_cancelled() {
            return InterpreterExit::SessionClosed;
        }
        debug!("console input exhausted");
        self.request_exit();
        InterpreterExit::InputClosed
    }

    fn request_exit(&self) {
        self.state.request_exit();
        self.shutdown.cancel();
    }
}
