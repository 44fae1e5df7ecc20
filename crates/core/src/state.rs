//! Shared Session State
//!
//! State touched by both the command interpreter and the inbound dispatch
//! path. All access goes through a mutex (device id and throttle) or an
//! atomic (exit flag); callers share it behind an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::throttle::TelemetryThrottle;

/// How an inbound envelope's `accid` updates the current device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceIdPolicy {
    /// Always take the inbound value, even when it is absent.
    #[default]
    Overwrite,
    /// Ignore absent or empty inbound values.
    KeepLastKnown,
}

#[derive(Debug)]
struct Inner {
    device_id: Option<String>,
    throttle: TelemetryThrottle,
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub device_id: Option<String>,
    pub telemetry_visible: bool,
    pub telemetry_interval_secs: f64,
    pub exit_requested: bool,
}

/// Synchronized state for one connection attempt.
#[derive(Debug)]
pub struct SessionState {
    exit_requested: AtomicBool,
    policy: DeviceIdPolicy,
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new(
        default_device_id: impl Into<String>,
        policy: DeviceIdPolicy,
        throttle: TelemetryThrottle,
    ) -> Self {
        Self {
            exit_requested: AtomicBool::new(false),
            policy,
            inner: Mutex::new(Inner {
                device_id: Some(default_device_id.into()),
                throttle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves Inner consistent, so a poisoned
        // guard is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn policy(&self) -> DeviceIdPolicy {
        self.policy
    }

    pub fn device_id(&self) -> Option<String> {
        self.lock().device_id.clone()
    }

    /// Apply the identifier declared by an inbound envelope.
    ///
    /// Returns whether the stored identifier changed.
    pub fn learn_device_id(&self, declared: Option<String>) -> bool {
        if self.policy == DeviceIdPolicy::KeepLastKnown
            && declared.as_deref().map_or(true, str::is_empty)
        {
            return false;
        }
        let mut inner = self.lock();
        let changed = inner.device_id != declared;
        inner.device_id = declared;
        changed
    }

    pub fn request_exit(&self) {
        self.exit_requested.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::SeqCst)
    }

    pub fn set_telemetry_visible(&self, visible: bool) {
        self.lock().throttle.set_visible(visible);
    }

    pub fn telemetry_visible(&self) -> bool {
        self.lock().throttle.visible()
    }

    /// Set the display interval; invalid values leave it unchanged.
    pub fn set_telemetry_interval(&self, interval_secs: f64) -> CoreResult<()> {
        self.lock().throttle.set_interval_secs(interval_secs)
    }

    pub fn telemetry_interval(&self) -> f64 {
        self.lock().throttle.interval_secs()
    }

    /// Evaluate the throttle for a message arriving at `now`, recording the
    /// display when it passes. Check and update happen under one lock.
    pub fn admit_telemetry(&self, now: Instant) -> bool {
        self.lock().throttle.admit(now)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            device_id: inner.device_id.clone(),
            telemetry_visible: inner.throttle.visible(),
            telemetry_interval_secs: inner.throttle.interval_secs(),
            exit_requested: self.exit_requested(),
        }
    }
}
