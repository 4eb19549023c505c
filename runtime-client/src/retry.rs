use soapbox_core::{CoreError, ErrorExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    /// Retry config for the job runtime. Creations are cheap to repeat
    /// (acceptance only), so a short base delay is enough.
    pub fn runtime() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

/// Calculate delay with exponential backoff and jitter
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_delay = Duration::from_millis(config.base_delay_ms);
    let max_delay = Duration::from_millis(config.max_delay_ms);

    let exponential_delay = if attempt == 0 {
        base_delay
    } else {
        let multiplier = config.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (config.base_delay_ms as f64 * multiplier) as u64;
        Duration::from_millis(delay_ms.min(config.max_delay_ms))
    };

    // Jitter prevents synchronized retries across dispatches.
    let jitter_range = (exponential_delay.as_millis() as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);
    let final_delay = exponential_delay + Duration::from_millis(jitter);

    final_delay.min(max_delay)
}

/// Wraps operations with retry logic driven by [`ErrorExt`]: transient
/// errors back off and retry, permanent ones surface immediately.
#[derive(Debug)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub async fn execute<F, Fut, T>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut last_error: Option<CoreError> = None;

        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                debug!("Retry attempt {} for {}", attempt, operation_name);
            }

            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            "Operation {} succeeded after {} retries",
                            operation_name, attempt
                        );
                    }
                    return Ok(result);
                }
                Err(error) => {
                    let should_retry = attempt + 1 < self.config.max_attempts;

                    if !error.is_retryable() {
                        debug!(
                            "Not retrying {} due to error type: {}",
                            operation_name, error
                        );
                        return Err(error);
                    }

                    if should_retry {
                        // An error that names its own delay wins over backoff.
                        let delay = error
                            .retry_after()
                            .unwrap_or_else(|| calculate_delay(attempt, &self.config));

                        info!(
                            "Retrying {} in {:?} due to: {}",
                            operation_name, delay, error
                        );
                        last_error = Some(error);
                        sleep(delay).await;
                    } else {
                        last_error = Some(error);
                    }
                }
            }
        }

        let error = last_error.unwrap_or_else(|| CoreError::Internal {
            message: "Unknown error during retry execution".to_string(),
        });
        warn!(
            "Operation {} failed after {} attempts: {}",
            operation_name, self.config.max_attempts, error
        );
        Err(error)
    }
}
