//! Elapsed-time logging for top-level planning operations.

use std::time::{Duration, Instant};

/// Logs the elapsed time of an operation when dropped.
///
/// Durations above the threshold are logged at warn level, others at debug.
#[derive(Debug)]
pub struct OperationTimer {
    operation: &'static str,
    started: Instant,
    slow_threshold: Duration,
}

impl OperationTimer {
    pub fn start(operation: &'static str, slow_threshold: Duration) -> Self {
        Self {
            operation,
            started: Instant::now(),
            slow_threshold,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        elapsed > self.slow_threshold
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        if self.is_slow(elapsed) {
            tracing::warn!(operation = self.operation, elapsed_ms, "slow operation");
        } else {
            tracing::debug!(operation = self.operation, elapsed_ms, "operation finished");
        }
    }
}
