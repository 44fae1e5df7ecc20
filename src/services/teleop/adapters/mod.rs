//! Transport Adapters
//!
//! Trait definition for the persistent-socket collaborator behind a session.
//! Each adapter owns connect mechanics and reports what happens on the wire
//! as [`TransportEvent`]s.

pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::TransportEvent;
use crate::utils::error::AppResult;

/// Transport adapter trait for the device connection.
///
/// Adapters are responsible for:
/// - Connecting to the device endpoint
/// - Emitting `Open` once, with a sender for outbound text
/// - Emitting each inbound message in arrival order
/// - Emitting `Close` when the remote side closes or the connection fails
#[async_trait]
pub trait TeleopAdapter: Send + Sync {
    /// Adapter type identifier
    fn kind(&self) -> &'static str;

    /// Start connecting.
    ///
    /// Events are forwarded through the provided mpsc sender channel. The
    /// adapter should spawn its own task for the connection.
    async fn start(&self, events: mpsc::Sender<TransportEvent>) -> AppResult<()>;

    /// Close the connection gracefully.
    async fn stop(&self) -> AppResult<()>;
}
