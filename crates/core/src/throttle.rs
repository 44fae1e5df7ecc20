//! Telemetry Throttle
//!
//! Decides whether an inbound telemetry message is surfaced to the operator.
//! A message is shown when display is enabled and at least `interval_secs`
//! have passed since the last line that was actually shown.

use std::time::Instant;

use crate::error::{CoreError, CoreResult};

/// Default spacing between displayed telemetry lines.
pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;

/// Rate limiter for displayed telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryThrottle {
    visible: bool,
    interval_secs: f64,
    /// `None` until the first line is shown; compares as elapsed.
    last_displayed_at: Option<Instant>,
}

impl TelemetryThrottle {
    /// Create a throttle, validating the interval.
    pub fn new(visible: bool, interval_secs: f64) -> CoreResult<Self> {
        Ok(Self {
            visible,
            interval_secs: validate_interval(interval_secs)?,
            last_displayed_at: None,
        })
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    /// Change the interval. Takes effect on the next evaluation; an invalid
    /// value leaves the current interval untouched.
    pub fn set_interval_secs(&mut self, interval_secs: f64) -> CoreResult<()> {
        self.interval_secs = validate_interval(interval_secs)?;
        Ok(())
    }

    /// Whether a message arriving at `now` should be displayed.
    pub fn should_display(&self, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        match self.last_displayed_at {
            None => true,
            Some(last) => now.saturating_duration_since(last).as_secs_f64() >= self.interval_secs,
        }
    }

    /// Record that a line was displayed at `now`.
    pub fn on_display(&mut self, now: Instant) {
        self.last_displayed_at = Some(now);
    }

    /// `should_display` followed by `on_display` when it passes.
    pub fn admit(&mut self, now: Instant) -> bool {
        let display = self.should_display(now);
        if display {
            self.on_display(now);
        }
        display
    }
}

impl Default for TelemetryThrottle {
    fn default() -> Self {
        Self {
            visible: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
            last_displayed_at: None,
        }
    }
}

fn validate_interval(interval_secs: f64) -> CoreResult<f64> {
    if interval_secs.is_finite() && interval_secs > 0.0 {
        Ok(interval_secs)
    } else {
        Err(CoreError::validation(format!(
            "telemetry interval must be a positive number of seconds, got {}",
            interval_secs
        )))
    }
}
