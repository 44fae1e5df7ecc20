//! Configuration Integration Tests
//!
//! Config files on disk combined with command line overrides, the way the
//! binary assembles its settings.

use std::fs;

use clap::Parser;
use robot_teleop::cli::Cli;
use robot_teleop::storage::{ConfigService, ConfigSource};
use robot_teleop::AppError;
use robot_teleop_core::DeviceIdPolicy;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"server_url": "wss://robot.example:443/ws", "device_id_policy": "keep_last_known"}"#,
    );

    let service = ConfigService::load(Some(path.as_path())).unwrap();
    assert_eq!(service.source(), &ConfigSource::File(path.clone()));

    let config = service.get_config();
    assert_eq!(config.server_url, "wss://robot.example:443/ws");
    assert_eq!(config.device_id_policy, DeviceIdPolicy::KeepLastKnown);
    assert_eq!(config.default_device_id, "PF_TRON1A_260");
    assert!(!config.telemetry.visible);
    assert_eq!(config.telemetry.interval_secs, 5.0);
    assert_eq!(config.twist.repeat, 30);
}

#[test]
fn test_cli_flags_override_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"default_device_id": "FILE_ID", "telemetry": {"visible": false, "interval_secs": 10}}"#,
    );
    let cli = Cli::try_parse_from([
        "robot-teleop",
        "--config",
        path.to_str().unwrap(),
        "--device-id",
        "CLI_ID",
        "--show-telemetry",
        "--telemetry-interval",
        "0.5",
    ])
    .unwrap();

    let mut service = ConfigService::load(cli.config.as_deref()).unwrap();
    service.apply_overrides(cli.overrides()).unwrap();

    let config = service.into_config();
    assert_eq!(config.default_device_id, "CLI_ID");
    assert!(config.telemetry.visible);
    assert_eq!(config.telemetry.interval_secs, 0.5);

    let state = robot_teleop::session_state(&config).unwrap();
    assert_eq!(state.device_id().as_deref(), Some("CLI_ID"));
    assert!(state.telemetry_visible());
}

#[test]
fn test_invalid_override_leaves_config_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"server_url": "ws://127.0.0.1:5000"}"#);
    let cli = Cli::try_parse_from(["robot-teleop", "--url", "http://127.0.0.1:5000"]).unwrap();

    let mut service = ConfigService::load(Some(path.as_path())).unwrap();
    let err = service.apply_overrides(cli.overrides()).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(service.get_config().server_url, "ws://127.0.0.1:5000");
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"twist": {"repeat": 0}}"#);
    assert!(matches!(
        ConfigService::load(Some(path.as_path())),
        Err(AppError::Config(_))
    ));

    let path = write_config(&dir, "{ not json");
    assert!(matches!(
        ConfigService::load(Some(path.as_path())),
        Err(AppError::Serialization(_))
    ));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(ConfigService::load(Some(missing.as_path())).is_err());
}
