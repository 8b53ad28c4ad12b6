//! Provider execution with optional exponential backoff retry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::ProviderError;

use super::subprocess::{ProviderCommand, run_provider};

const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Trait for sending a prompt to a generation provider.
///
/// This abstraction allows mocking the provider subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderExecutor: Send + Sync {
    /// Send the prompt and return the raw response text.
    async fn run(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Executor that spawns the provider CLI.
pub struct SubprocessExecutor {
    command: ProviderCommand,
}

impl SubprocessExecutor {
    pub fn new(command: ProviderCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ProviderCommand {
        &self.command
    }
}

#[async_trait]
impl ProviderExecutor for SubprocessExecutor {
    async fn run(&self, prompt: &str) -> Result<String, ProviderError> {
        run_provider(&self.command, prompt).await
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `max_attempts` times (at least once). With more
/// than one attempt, the final error is wrapped by `wrap_exhausted`; a single
/// attempt returns its error unchanged.
pub async fn retry_with_backoff<T, E, Fut, F, W>(
    max_attempts: u32,
    mut attempt: F,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    W: FnOnce(E) -> E,
{
    let max_attempts = max_attempts.max(1);
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;
    loop {
        attempts += 1;

        let e = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempts >= max_attempts {
            return if max_attempts > 1 {
                Err(wrap_exhausted(e))
            } else {
                Err(e)
            };
        }

        warn!("Attempt {}/{} failed: {}", attempts, max_attempts, e);
        if let Some(wait_duration) = backoff.next_backoff() {
            tokio::time::sleep(wait_duration).await;
        }
    }
}

/// Send a prompt through the executor, retrying on failure.
pub async fn generate_with_retry<E: ProviderExecutor + ?Sized>(
    executor: &E,
    prompt: &str,
    max_attempts: u32,
) -> Result<String, ProviderError> {
    retry_with_backoff(
        max_attempts,
        || executor.run(prompt),
        |e| ProviderError::RetriesExhausted(Box::new(e)),
    )
    .await
}
