//! In-process WebSocket server for the integration tests.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use robot_teleop::console::{CaptureBuffer, Console};
use robot_teleop::run_with_adapter;
use robot_teleop::services::teleop::adapters::websocket::WebSocketAdapter;
use robot_teleop::utils::error::AppResult;
use robot_teleop::{ClientConfig, SessionSummary};
use robot_teleop_core::SessionState;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Bind a local port and accept exactly one WebSocket client.
pub async fn listen() -> (String, JoinHandle<ServerSocket>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio_tungstenite::accept_async(stream).await.unwrap()
    });
    (format!("ws://{}", addr), accept)
}

/// Next text frame from the client, or `None` once it closes.
pub async fn next_text(socket: &mut ServerSocket) -> Option<String> {
    loop {
        match tokio::time::timeout(Duration::from_secs(5), socket.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(text),
            Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) | Ok(None) => return None,
            Ok(Some(Ok(_))) => {}
            Err(_) => panic!("timed out waiting for a client frame"),
        }
    }
}

/// Every frame the client sends until its connection ends.
pub async fn frames_until_end(socket: &mut ServerSocket) -> Vec<Message> {
    let mut frames = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_secs(5), socket.next()).await {
            Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => {}
            Ok(Some(Ok(frame))) => {
                let is_close = matches!(frame, Message::Close(_));
                frames.push(frame);
                if is_close {
                    return frames;
                }
            }
            Ok(Some(Err(_))) | Ok(None) => return frames,
            Err(_) => panic!("timed out waiting for a client frame"),
        }
    }
}

/// A client session running against `config.server_url`.
pub struct RunningClient {
    pub state: Arc<SessionState>,
    pub console: CaptureBuffer,
    pub lines: mpsc::Sender<String>,
    pub shutdown: CancellationToken,
    pub task: JoinHandle<AppResult<SessionSummary>>,
}

pub fn start_client(config: ClientConfig) -> RunningClient {
    let state = robot_teleop::session_state(&config).unwrap();
    let (console, buffer) = Console::capture();
    let (lines, input) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let adapter = WebSocketAdapter::new(config.server_url.clone());

    let task = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            run_with_adapter(Box::new(adapter), state, &config, input, console, shutdown).await
        })
    };

    RunningClient {
        state,
        console: buffer,
        lines,
        shutdown,
        task,
    }
}

/// Poll `condition` until it holds or five seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
