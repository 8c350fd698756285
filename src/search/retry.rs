use super::config::HttpConfig;
use super::error::Retryable;
use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const BACKOFF_FACTOR: u32 = 2;

/// Per-attempt timeout plus bounded exponential backoff for outbound calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempt_timeout: Duration,
    pub max_attempts: usize,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            attempt_timeout: config.request_timeout,
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `on_timeout` builds the error reported when an
    /// attempt exceeds `attempt_timeout`.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        on_timeout: impl Fn(Duration) -> E,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            debug!(
                "{}: dispatching request (attempt {} of {})",
                label, attempt, max_attempts
            );

            let err = match timeout(self.attempt_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => {
                    warn!("{}: attempt {} failed: {}", label, attempt, err);
                    err
                }
                Err(_) => {
                    warn!(
                        "{}: attempt {} timed out after {:?}",
                        label, attempt, self.attempt_timeout
                    );
                    on_timeout(self.attempt_timeout)
                }
            };

            if attempt >= max_attempts || !err.is_retryable() {
                return Err(err);
            }

            debug!("{}: retrying after {:?} backoff", label, backoff);
            sleep(backoff).await;
            backoff = backoff.saturating_mul(BACKOFF_FACTOR);
            attempt += 1;
        }
    }
}
