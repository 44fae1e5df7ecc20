//! WebSocket Adapter
//!
//! Connects to the device with tokio-tungstenite. A reader loop turns frames
//! into [`TransportEvent`]s and a writer task drains the outbound channel.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::TeleopAdapter;
use crate::services::teleop::types::TransportEvent;
use crate::utils::error::AppResult;

/// How long `stop` waits for queued text and the close frame to go out.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Single-use WebSocket connection to the device.
pub struct WebSocketAdapter {
    pub(crate) url: String,
    pub(crate) cancel_token: CancellationToken,
    connection: Mutex<Option<JoinHandle<()>>>,
}

impl WebSocketAdapter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cancel_token: CancellationToken::new(),
            connection: Mutex::new(None),
        }
    }
}

fn close_event(frame: Option<CloseFrame<'_>>) -> TransportEvent {
    match frame {
        Some(frame) => TransportEvent::Close {
            code: Some(u16::from(frame.code)),
            reason: frame.reason.into_owned(),
        },
        None => TransportEvent::Close {
            code: None,
            reason: String::new(),
        },
    }
}

#[async_trait]
impl TeleopAdapter for WebSocketAdapter {
    fn kind(&self) -> &'static str {
        "websocket"
    }

    async fn start(&self, events: mpsc::Sender<TransportEvent>) -> AppResult<()> {
        let url = self.url.clone();
        let cancel = self.cancel_token.clone();

        let connection = tokio::spawn(async move {
            let connected = tokio::select! {
                result = tokio_tungstenite::connect_async(url.as_str()) => result,
                _ = cancel.cancelled() => return,
            };
            let stream = match connected {
                Ok((stream, _response)) => stream,
                Err(e) => {
                    warn!(url = %url, "connect failed: {}", e);
                    let _ = events
                        .send(TransportEvent::Close {
                            code: None,
                            reason: format!("connect to {} failed: {}", url, e),
                        })
                        .await;
                    return;
                }
            };
            info!(url = %url, "websocket connected");

            let (mut sink, mut source) = stream.split();
            let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
            if events
                .send(TransportEvent::Open {
                    outbound: outbound_tx,
                })
                .await
                .is_err()
            {
                return;
            }

            let writer_cancel = cancel.clone();
            let writer = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = writer_cancel.cancelled() => {
                            // Flush what was queued before the close.
                            while let Ok(text) = outbound_rx.try_recv() {
                                if sink.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                            let _ = sink.send(Message::Close(None)).await;
                            let _ = sink.close().await;
                            break;
                        }
                        text = outbound_rx.recv() => match text {
                            Some(text) => {
                                if let Err(e) = sink.send(Message::Text(text)).await {
                                    warn!("websocket send failed: {}", e);
                                    break;
                                }
                            }
                            None => break,
                        },
                    }
                }
            });

            let close = loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break None,
                    frame = source.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            if events.send(TransportEvent::Message(text)).await.is_err() {
                                break None;
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                            Ok(text) => {
                                if events.send(TransportEvent::Message(text)).await.is_err() {
                                    break None;
                                }
                            }
                            Err(_) => debug!("dropping non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Close(frame))) => break Some(close_event(frame)),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            break Some(TransportEvent::Close {
                                code: None,
                                reason: e.to_string(),
                            })
                        }
                        None => {
                            break Some(TransportEvent::Close {
                                code: None,
                                reason: "connection ended".to_string(),
                            })
                        }
                    },
                }
            };

            match close {
                Some(event) => {
                    writer.abort();
                    let _ = events.send(event).await;
                }
                None => {
                    let _ = writer.await;
                }
            }
            debug!(url = %url, "websocket reader finished");
        });
        *self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(connection);

        Ok(())
    }

    /// Cancel the connection and wait, up to [`CLOSE_TIMEOUT`], for the
    /// writer to flush queued text and send the close frame.
    async fn stop(&self) -> AppResult<()> {
        self.cancel_token.cancel();
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(mut connection) = connection else {
            return Ok(());
        };
        match tokio::time::timeout(CLOSE_TIMEOUT, &mut connection).await {
            Ok(Ok(())) => debug!(url = %self.url, "websocket closed"),
            Ok(Err(e)) => warn!(url = %self.url, "websocket task failed: {}", e),
            Err(_) => {
                warn!(url = %self.url, "websocket close timed out");
                connection.abort();
            }
        }
        Ok(())
    }
}
