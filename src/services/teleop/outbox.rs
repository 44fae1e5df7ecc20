//! Outbound send handle shared by the session and the interpreter.
//!
//! Holds the transport's outbound sender while the session is open. Sends
//! made while no sender is attached are dropped, not queued.

use std::sync::{Arc, RwLock};

use robot_teleop_core::{CoreError, CoreResult};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default)]
pub struct Outbox {
    link: Arc<RwLock<Option<mpsc::UnboundedSender<String>>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route sends to `sender` (session entered Open).
    pub fn attach(&self, sender: mpsc::UnboundedSender<String>) {
        *self.link.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender);
    }

    /// Stop accepting sends (session entered Closed).
    pub fn detach(&self) {
        *self.link.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub fn is_open(&self) -> bool {
        self.link
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Hand one wire message to the transport.
    pub fn send(&self, text: String) -> CoreResult<()> {
        let guard = self.link.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(sender) => sender
                .send(text)
                .map_err(|_| CoreError::transport("connection writer has stopped")),
            None => Err(CoreError::transport("session is not open")),
        }
    }
}
