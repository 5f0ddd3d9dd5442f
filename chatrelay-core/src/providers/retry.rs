//! Retry policy for resilient provider operations
//!
//! This module implements configurable retry policies with exponential backoff
//! and jitter. Only errors that [`ProviderError::is_retryable`] accepts are
//! retried.

use crate::config::RetryConfig;
use crate::providers::ProviderError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::warn;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    /// Initial delay before first retry (milliseconds)
    pub initial_delay_ms: u64,

    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,

    /// Base for exponential backoff (e.g., 2.0 for doubling)
    pub exponential_base: f64,

    /// Jitter factor (0.0 to 1.0) to randomize delays
    pub jitter_factor: f64,

    /// Whether to respect retry-after hints from the provider
    pub respect_retry_after: bool,

    /// Maximum total time to spend retrying (milliseconds)
    pub timeout_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            exponential_base: 2.0,
            jitter_factor: 0.1,
            respect_retry_after: true,
            timeout_ms: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay_ms: config.initial_delay_ms,
            max_delay_ms: config.max_delay_ms,
            exponential_base: config.backoff_multiplier,
            jitter_factor: if config.jitter { 0.1 } else { 0.0 },
            ..Default::default()
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom configuration
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate the delay for a given retry attempt
    pub fn calculate_delay(&self, attempt: u32, error: &ProviderError) -> Duration {
        // Check for retry-after hint first
        if self.respect_retry_after {
            if let Some(retry_after) = error.retry_delay() {
                return retry_after.min(Duration::from_millis(self.max_delay_ms));
            }
        }

        // Calculate exponential backoff
        let base_delay = self.initial_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        // Add jitter
        let delay_with_jitter = if self.jitter_factor > 0.0 {
            let mut rng = rand::thread_rng();
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rng.gen_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(delay_with_jitter as u64)
    }

    /// Check if we should retry based on the error and attempt count
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        error.is_retryable()
    }
}

/// Result of a retry operation
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    /// The successful result (if any)
    pub result: Option<T>,

    /// Number of retry attempts made
    pub attempts: u32,

    /// Total time spent sleeping between attempts
    pub total_delay_ms: u64,

    /// The final error (if failed)
    pub final_error: Option<ProviderError>,

    /// All errors encountered during retries
    pub error_history: Vec<ProviderError>,
}

impl<T> RetryResult<T> {
    /// Collapse into a plain `Result`
    pub fn into_result(self) -> Result<T, ProviderError> {
        match (self.result, self.final_error) {
            (Some(result), _) => Ok(result),
            (None, Some(error)) => Err(error),
            (None, None) => Err(ProviderError::Network(
                "Retry finished without a result".to_string(),
            )),
        }
    }
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, T, Fut>(&self, mut operation: F) -> RetryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut attempts = 0;
        let mut total_delay_ms = 0;
        let mut error_history = Vec::new();
        let start_time = Instant::now();

        loop {
            match operation().await {
                Ok(result) => {
                    return RetryResult {
                        result: Some(result),
                        attempts,
                        total_delay_ms,
                        final_error: None,
                        error_history,
                    };
                }
                Err(error) => {
                    error_history.push(error.clone());

                    if !self.policy.should_retry(&error, attempts) {
                        return RetryResult {
                            result: None,
                            attempts,
                            total_delay_ms,
                            final_error: Some(error),
                            error_history,
                        };
                    }

                    if let Some(timeout_ms) = self.policy.timeout_ms {
                        if start_time.elapsed().as_millis() > timeout_ms as u128 {
                            return RetryResult {
                                result: None,
                                attempts,
                                total_delay_ms,
                                final_error: Some(ProviderError::Timeout(format!(
                                    "Retry budget of {}ms exhausted: {}",
                                    timeout_ms, error
                                ))),
                                error_history,
                            };
                        }
                    }

                    let delay = self.policy.calculate_delay(attempts, &error);
                    total_delay_ms += delay.as_millis() as u64;

                    warn!(
                        "Attempt {} failed ({}), retrying in {}ms",
                        attempts + 1,
                        error,
                        delay.as_millis()
                    );

                    tokio::time::sleep(delay).await;
                    attempts += 1;
                }
            }
        }
    }

    /// Execute an operation and return its final outcome
    pub async fn run<F, T, Fut>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        self.execute(operation).await.into_result()
    }
}
