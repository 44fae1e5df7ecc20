//! Tracing infrastructure.
//!
//! Diagnostics go to stderr so the operator console on stdout stays readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `--log-filter` is given.
pub const DEFAULT_FILTER: &str = "robot_teleop=warn,robot_teleop_core=warn";

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `fallback`, which wins over [`DEFAULT_FILTER`].
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}
