use anyhow::{anyhow, Result};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (or `debug` when verbose).
pub fn init_tracing(default_level: &str, verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", fallback, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Logs how long an operation took when dropped
pub struct PerformanceTracker {
    start_time: Instant,
    operation_name: &'static str,
}

impl PerformanceTracker {
    pub fn new(operation_name: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            operation_name,
        }
    }
}

impl Drop for PerformanceTracker {
    fn drop(&mut self) {
        let duration = self.start_time.elapsed();
        debug!(
            operation = %self.operation_name,
            duration_us = %duration.as_micros(),
            "Operation completed"
        );
    }
}
