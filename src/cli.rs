//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::models::settings::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "robot-teleop",
    about = "Drive a WebSocket-connected robot from the terminal",
    version
)]
pub struct Cli {
    /// Config file (default: <config dir>/robot-teleop/config.json)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server endpoint, ws:// or wss://
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Device identifier used until the robot announces one
    #[arg(long, value_name = "ID")]
    pub device_id: Option<String>,

    /// Display telemetry from the start
    #[arg(long)]
    pub show_telemetry: bool,

    /// Minimum seconds between displayed telemetry lines
    #[arg(long, value_name = "SECONDS")]
    pub telemetry_interval: Option<f64>,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Config fields set on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.url.clone(),
            default_device_id: self.device_id.clone(),
            telemetry_visible: self.show_telemetry.then_some(true),
            telemetry_interval_secs: self.telemetry_interval,
        }
    }
}
