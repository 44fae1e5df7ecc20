//! Settings Models
//!
//! Client configuration and settings data structures.

use std::time::Duration;

use robot_teleop_core::DeviceIdPolicy;
use serde::{Deserialize, Serialize};

/// Accepted twist cadence, in sends per second.
pub const TWIST_RATE_RANGE_HZ: std::ops::RangeInclusive<f64> = 0.1..=1000.0;

/// Client configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote endpoint, `ws://` or `wss://`
    pub server_url: String,
    /// Device identifier used until the device announces its own
    pub default_device_id: String,
    /// How inbound `accid` values update the device identifier
    pub device_id_policy: DeviceIdPolicy,
    pub telemetry: TelemetrySettings,
    pub twist: TwistSettings,
}

/// Initial telemetry display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub visible: bool,
    /// Minimum spacing between displayed telemetry lines
    pub interval_secs: f64,
}

/// Twist burst shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwistSettings {
    /// Envelopes sent per `twist` command
    pub repeat: u32,
    /// Sends per second within a burst
    pub rate_hz: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://10.192.1.2:5000".to_string(),
            default_device_id: "PF_TRON1A_260".to_string(),
            device_id_policy: DeviceIdPolicy::Overwrite,
            telemetry: TelemetrySettings::default(),
            twist: TwistSettings::default(),
        }
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            visible: false,
            interval_secs: 5.0,
        }
    }
}

impl TwistSettings {
    /// Spacing between consecutive sends of a burst. `rate_hz` must already
    /// be within [`TWIST_RATE_RANGE_HZ`], which `ClientConfig::validate` checks.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}

impl Default for TwistSettings {
    fn default() -> Self {
        Self {
            repeat: 30,
            rate_hz: 30.0,
        }
    }
}

/// Settings overrides from the command line (partial update)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub default_device_id: Option<String>,
    pub telemetry_visible: Option<bool>,
    pub telemetry_interval_secs: Option<f64>,
}

impl ClientConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: ConfigOverrides) {
        if let Some(url) = update.server_url {
            self.server_url = url;
        }
        if let Some(device_id) = update.default_device_id {
            self.default_device_id = device_id;
        }
        if let Some(visible) = update.telemetry_visible {
            self.telemetry.visible = visible;
        }
        if let Some(interval) = update.telemetry_interval_secs {
            self.telemetry.interval_secs = interval;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.server_url)
            .map_err(|e| format!("server_url '{}' is not a valid URL: {}", self.server_url, e))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(format!(
                "server_url must use ws:// or wss://, got '{}'",
                self.server_url
            ));
        }
        if !(self.telemetry.interval_secs.is_finite() && self.telemetry.interval_secs > 0.0) {
            return Err("telemetry.interval_secs must be greater than 0".to_string());
        }
        if self.twist.repeat == 0 {
            return Err("twist.repeat must be at least 1".to_string());
        }
        if !TWIST_RATE_RANGE_HZ.contains(&self.twist.rate_hz) {
            return Err(format!(
                "twist.rate_hz must be between {} and {}",
                TWIST_RATE_RANGE_HZ.start(),
                TWIST_RATE_RANGE_HZ.end()
            ));
        }
        Ok(())
    }
}
