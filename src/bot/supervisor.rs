//! Restart-with-backoff wrapper for long-running tasks.

use signalbot_core::config::SupervisorConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exponential restart delay.
///
/// Doubles per consecutive failure up to `max`. A run that lasted at least
/// `reset_after` before failing starts the sequence over.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    reset_after: Duration,
    next: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, reset_after: Duration) -> Self {
        Self {
            initial,
            max,
            reset_after,
            next: initial,
        }
    }

    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self::new(
            config.initial_backoff(),
            config.max_backoff(),
            config.reset_after(),
        )
    }

    /// Delay before the next restart, given how long the failed run lasted.
    pub fn next_delay(&mut self, ran_for: Duration) -> Duration {
        if ran_for >= self.reset_after {
            self.next = self.initial;
        }
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&SupervisorConfig::default())
    }
}

/// Run `task` until it succeeds, restarting it after each failure.
///
/// Returns `None` when `cancel` fires, whether the task is running or the
/// supervisor is sleeping between attempts. Cancellation is never retried.
pub async fn run_supervised<F, Fut, T, E>(
    name: &str,
    cancel: &CancellationToken,
    mut backoff: Backoff,
    mut task: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    loop {
        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("{name} cancelled");
                return None;
            }
            result = task() => result,
        };

        let error = match result {
            Ok(value) => return Some(value),
            Err(e) => e,
        };

        let delay = backoff.next_delay(started.elapsed());
        warn!("{name} failed: {error}; restarting in {}s", delay.as_secs_f64());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("{name} cancelled during backoff");
                return None;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
