//! Session Integration Tests
//!
//! Drive the client against a live WebSocket server and check what crosses
//! the wire and what reaches the console.

use std::time::Duration;

use futures_util::SinkExt;
use robot_teleop::models::settings::ClientConfig;
use robot_teleop::{CloseCause, InterpreterExit};
use robot_teleop_core::Envelope;
use serde_json::json;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::support::{eventually, frames_until_end, listen, next_text, start_client};

fn config_for(url: String) -> ClientConfig {
    ClientConfig {
        server_url: url,
        ..ClientConfig::default()
    }
}

// ============================================================================
// Command Flow Tests
// ============================================================================

#[tokio::test]
async fn test_commands_use_learned_device_id() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    server
        .send(Message::Text(
            json!({"accid": "X1", "title": "notify_robot_info", "data": {}}).to_string(),
        ))
        .await
        .unwrap();
    let state = client.state.clone();
    eventually(|| state.device_id().as_deref() == Some("X1")).await;

    client.lines.send("stand".to_string()).await.unwrap();
    let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
    assert_eq!(sent.title, "request_stand_mode");
    assert_eq!(sent.device_id.as_deref(), Some("X1"));
    assert!(sent.payload.is_empty());
    assert_eq!(sent.correlation_id.len(), 36);

    client.lines.send("exit".to_string()).await.unwrap();
    assert!(next_text(&mut server).await.is_none());

    let summary = client.task.await.unwrap().unwrap();
    assert_eq!(summary.cause, CloseCause::Local);
    assert_eq!(summary.interpreter, Some(InterpreterExit::ExitCommand));
    assert!(summary.final_state.exit_requested);

    let lines = client.console.lines();
    assert!(lines.contains(&"Connected!".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("Connection closed."));
}

#[tokio::test]
async fn test_default_device_id_before_any_telemetry() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    client.lines.send("stop".to_string()).await.unwrap();
    let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
    assert_eq!(sent.title, "request_emgy_stop");
    assert_eq!(sent.device_id.as_deref(), Some("PF_TRON1A_260"));

    client.shutdown.cancel();
    client.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_twist_burst_over_the_wire() {
    let (url, accept) = listen().await;
    let mut config = config_for(url);
    config.twist.repeat = 3;
    config.twist.rate_hz = 100.0;
    let client = start_client(config);
    let mut server = accept.await.unwrap();

    for line in ["twist", "0.5", "0", "-0.25"] {
        client.lines.send(line.to_string()).await.unwrap();
    }

    for _ in 0..3 {
        let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
        assert_eq!(sent.title, "request_twist");
        assert_eq!(sent.payload.get("x"), Some(&json!(0.5)));
        assert_eq!(sent.payload.get("y"), Some(&json!(0.0)));
        assert_eq!(sent.payload.get("z"), Some(&json!(-0.25)));
    }

    client.lines.send("imu".to_string()).await.unwrap();
    client.lines.send("true".to_string()).await.unwrap();
    let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
    assert_eq!(sent.title, "request_enable_imu");
    assert_eq!(sent.payload.get("enable"), Some(&json!(true)));

    client.lines.send("exit".to_string()).await.unwrap();
    client.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_bad_coordinate_sends_nothing() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    for line in ["twist", "abc", "sit"] {
        client.lines.send(line.to_string()).await.unwrap();
    }
    let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
    assert_eq!(sent.title, "request_sitdown");

    client.lines.send("exit".to_string()).await.unwrap();
    client.task.await.unwrap().unwrap();
    assert!(client
        .console
        .contents()
        .contains("Invalid coordinate 'abc', please enter a number."));
}

// ============================================================================
// Telemetry Tests
// ============================================================================

#[tokio::test]
async fn test_visible_telemetry_is_echoed_raw() {
    let (url, accept) = listen().await;
    let mut config = config_for(url);
    config.telemetry.visible = true;
    let client = start_client(config);
    let mut server = accept.await.unwrap();

    let raw = r#"{"accid":"X7","title":"notify_robot_info","data":{"battery":90}}"#;
    server.send(Message::Text(raw.to_string())).await.unwrap();
    // Within the interval, so throttled.
    server
        .send(Message::Text(r#"{"accid":"X8"}"#.to_string()))
        .await
        .unwrap();

    let state = client.state.clone();
    eventually(|| state.device_id().as_deref() == Some("X8")).await;

    client.shutdown.cancel();
    let summary = client.task.await.unwrap().unwrap();
    assert_eq!(summary.messages_received, 2);
    assert_eq!(summary.telemetry_displayed, 1);

    let echoed: Vec<String> = client
        .console
        .lines()
        .into_iter()
        .filter(|line| line.starts_with("Received message: "))
        .collect();
    assert_eq!(echoed, vec![format!("Received message: {}", raw)]);
}

#[tokio::test]
async fn test_malformed_telemetry_keeps_session_alive() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    server
        .send(Message::Text(r#"{"accid":"X2","ti"#.to_string()))
        .await
        .unwrap();
    server
        .send(Message::Text(r#"{"accid":"X3"}"#.to_string()))
        .await
        .unwrap();

    let state = client.state.clone();
    eventually(|| state.device_id().as_deref() == Some("X3")).await;

    client.lines.send("walk".to_string()).await.unwrap();
    let sent = Envelope::decode(next_text(&mut server).await.unwrap()).unwrap();
    assert_eq!(sent.title, "request_walk_mode");
    assert_eq!(sent.device_id.as_deref(), Some("X3"));

    client.shutdown.cancel();
    let summary = client.task.await.unwrap().unwrap();
    assert_eq!(summary.decode_failures, 1);
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_server_close_ends_session() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    let state = client.state.clone();
    let console = client.console.clone();
    eventually(|| console.contents().contains("Connected!")).await;

    server
        .close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "maintenance".into(),
        }))
        .await
        .unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), client.task)
        .await
        .expect("session did not end")
        .unwrap()
        .unwrap();
    assert_eq!(
        summary.cause,
        CloseCause::Remote {
            code: Some(1000),
            reason: "maintenance".to_string()
        }
    );
    assert_eq!(summary.interpreter, Some(InterpreterExit::SessionClosed));
    assert!(!state.exit_requested());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exit_flushes_queued_envelope_then_closes() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    let console = client.console.clone();
    eventually(|| console.contents().contains("Connected!")).await;

    // Queue both lines at once so the envelope is still pending when exit lands.
    client.lines.send("stand".to_string()).await.unwrap();
    client.lines.send("exit".to_string()).await.unwrap();

    // The session only finishes once the close frame has been written.
    let summary = client.task.await.unwrap().unwrap();
    assert_eq!(summary.cause, CloseCause::Local);

    let frames = frames_until_end(&mut server).await;
    assert_eq!(frames.len(), 2, "frames: {:?}", frames);
    match &frames[0] {
        Message::Text(text) => {
            assert_eq!(Envelope::decode(text).unwrap().title, "request_stand_mode")
        }
        other => panic!("expected the stand envelope, got {:?}", other),
    }
    assert!(matches!(frames[1], Message::Close(_)));
}

#[tokio::test]
async fn test_unreachable_server() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = start_client(config_for(format!("ws://127.0.0.1:{}", port)));

    let summary = client.task.await.unwrap().unwrap();
    assert!(matches!(summary.cause, CloseCause::Remote { code: None, .. }));
    assert!(summary.interpreter.is_none());

    let lines = client.console.lines();
    assert!(!lines.contains(&"Connected!".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("Connection closed."));
}

#[tokio::test]
async fn test_end_of_input_requests_exit() {
    let (url, accept) = listen().await;
    let client = start_client(config_for(url));
    let mut server = accept.await.unwrap();

    drop(client.lines);
    assert!(next_text(&mut server).await.is_none());

    let summary = client.task.await.unwrap().unwrap();
    assert_eq!(summary.cause, CloseCause::Local);
    assert_eq!(summary.interpreter, Some(InterpreterExit::InputClosed));
    assert!(summary.final_state.exit_requested);
}
