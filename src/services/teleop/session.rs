//! Connection Session
//!
//! Drives one connection through `Connecting -> Open -> Closed`. Inbound
//! messages are handled on this task in arrival order; the command
//! interpreter is spawned as its own task once the connection opens, and the
//! two share only the session state and the outbox.

use std::sync::Arc;
use std::time::Instant;

use robot_teleop_core::{Envelope, SessionState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::adapters::TeleopAdapter;
use super::interpreter::CommandInterpreter;
use super::outbox::Outbox;
use super::types::{CloseCause, InterpreterExit, SessionStatus, SessionSummary, TransportEvent};
use crate::console::Console;
use crate::models::settings::TwistSettings;
use crate::utils::error::AppResult;

/// Transport events buffered ahead of dispatch.
pub const EVENT_BUFFER: usize = 256;

pub struct ConnectionSession {
    adapter: Box<dyn TeleopAdapter>,
    state: Arc<SessionState>,
    outbox: Outbox,
    console: Console,
    shutdown: CancellationToken,
    status: SessionStatus,
    messages_received: u64,
    telemetry_displayed: u64,
    decode_failures: u64,
}

impl ConnectionSession {
    pub fn new(
        adapter: Box<dyn TeleopAdapter>,
        state: Arc<SessionState>,
        console: Console,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            adapter,
            state,
            outbox: Outbox::new(),
            console,
            shutdown,
            status: SessionStatus::Connecting,
            messages_received: 0,
            telemetry_displayed: 0,
            decode_failures: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    /// Build the interpreter that this session starts on open.
    pub fn interpreter(
        &self,
        input: mpsc::Receiver<String>,
        twist: TwistSettings,
    ) -> CommandInterpreter {
        CommandInterpreter::new(
            input,
            self.state.clone(),
            self.outbox.clone(),
            self.console.clone(),
            twist,
            self.shutdown.clone(),
        )
    }

    /// Run the session to completion.
    pub async fn run(mut self, interpreter: CommandInterpreter) -> AppResult<SessionSummary> {
        let (events_tx, mut events) = mpsc::channel(EVENT_BUFFER);
        self.adapter.start(events_tx).await?;
        debug!(adapter = self.adapter.kind(), "session connecting");

        let mut interpreter = Some(interpreter);
        let mut interpreter_task: Option<JoinHandle<InterpreterExit>> = None;

        let cause = loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break CloseCause::Local,
                event = events.recv() => match event {
                    Some(TransportEvent::Open { outbound }) => {
                        self.outbox.attach(outbound);
                        self.transition(SessionStatus::Open);
                        self.console.line("Connected!");
                        if let Some(interpreter) = interpreter.take() {
                            interpreter_task = Some(tokio::spawn(interpreter.run()));
                        }
                    }
                    Some(TransportEvent::Message(raw)) => {
                        self.handle_inbound(&raw, Instant::now());
                    }
                    Some(TransportEvent::Close { code, reason }) => {
                        break CloseCause::Remote { code, reason };
                    }
                    None => {
                        break CloseCause::Remote {
                            code: None,
                            reason: "transport stopped reporting events".to_string(),
                        };
                    }
                },
            }
        };

        // Unblocks a reader waiting on a full event channel.
        drop(events);
        self.outbox.detach();
        self.transition(SessionStatus::Closed);
        match &cause {
            CloseCause::Local => {
                if let Err(e) = self.adapter.stop().await {
                    warn!("failed to close transport: {}", e);
                }
            }
            CloseCause::Remote { code, reason } => {
                info!(code = ?code, reason = %reason, "connection closed by transport");
            }
        }
        self.console.line("Connection closed.");
        self.shutdown.cancel();

        let interpreter_exit = match interpreter_task {
            Some(task) => match task.await {
                Ok(exit) => Some(exit),
                Err(e) => {
                    warn!("command interpreter task failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(SessionSummary {
            cause,
            interpreter: interpreter_exit,
            messages_received: self.messages_received,
            telemetry_displayed: self.telemetry_displayed,
            decode_failures: self.decode_failures,
            final_state: self.state.snapshot(),
        })
    }

    /// Process one inbound message arriving at `now`. Returns whether it was
    /// displayed. Undecodable messages are logged at debug and ignored.
    pub fn handle_inbound(&mut self, raw: &str, now: Instant) -> bool {
        self.messages_received += 1;
        let envelope = match Envelope::decode(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.decode_failures += 1;
                debug!("ignoring inbound message: {}", e);
                return false;
            }
        };

        if self.state.learn_device_id(envelope.device_id) {
            debug!(
                device_id = ?self.state.device_id(),
                policy = ?self.state.policy(),
                "device id updated"
            );
        }
        if !self.state.admit_telemetry(now) {
            return false;
        }
        self.telemetry_displayed += 1;
        self.console.line(format!("Received message: {}", raw));
        true
    }

    fn transition(&mut self, next: SessionStatus) {
        debug!(from = %self.status, to = %next, "session status");
        self.status = next;
    }
}
