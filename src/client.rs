//! Client Runner
//!
//! Wires configuration, session state, the transport adapter, and the
//! console into one connection session and runs it to completion.

use std::sync::Arc;

use robot_teleop_core::{SessionState, TelemetryThrottle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::console::Console;
use crate::models::settings::ClientConfig;
use crate::services::teleop::adapters::websocket::WebSocketAdapter;
use crate::services::teleop::adapters::TeleopAdapter;
use crate::services::teleop::session::ConnectionSession;
use crate::services::teleop::SessionSummary;
use crate::utils::error::AppResult;

/// Initial session state for `config`.
pub fn session_state(config: &ClientConfig) -> AppResult<Arc<SessionState>> {
    let throttle = TelemetryThrottle::new(config.telemetry.visible, config.telemetry.interval_secs)?;
    Ok(Arc::new(SessionState::new(
        config.default_device_id.clone(),
        config.device_id_policy,
        throttle,
    )))
}

/// Connect to `config.server_url` and run one session. Ctrl-C ends it.
pub async fn run_client(
    config: &ClientConfig,
    input: mpsc::Receiver<String>,
    console: Console,
) -> AppResult<SessionSummary> {
    let adapter = WebSocketAdapter::new(config.server_url.clone());
    let shutdown = CancellationToken::new();
    let state = session_state(config)?;

    let interrupt = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("interrupt received"),
                        Err(e) => warn!("failed to listen for interrupt: {}", e),
                    }
                    state.request_exit();
                    shutdown.cancel();
                }
            }
        })
    };

    console.line("Press Ctrl+C to exit.");
    let summary = run_with_adapter(Box::new(adapter), state, config, input, console, shutdown).await;
    interrupt.abort();
    summary
}

/// Run one session over `adapter`.
pub async fn run_with_adapter(
    adapter: Box<dyn TeleopAdapter>,
    state: Arc<SessionState>,
    config: &ClientConfig,
    input: mpsc::Receiver<String>,
    console: Console,
    shutdown: CancellationToken,
) -> AppResult<SessionSummary> {
    info!(
        url = %config.server_url,
        adapter = adapter.kind(),
        device_id = %config.default_device_id,
        "starting session"
    );
    let session = ConnectionSession::new(adapter, state, console, shutdown);
    let interpreter = session.interpreter(input, config.twist.clone());
    let summary = session.run(interpreter).await?;
    info!(
        cause = ?summary.cause,
        messages = summary.messages_received,
        displayed = summary.telemetry_displayed,
        decode_failures = summary.decode_failures,
        "session finished"
    );
    Ok(summary)
}
