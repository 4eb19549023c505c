use crate::error::*;
use std::time::Duration;
use tracing::{error, warn};

/// Classification helpers shared by the retry layer and the CLI.
pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    /// Whether repeating the operation can plausibly succeed.
    fn is_retryable(&self) -> bool;
    /// Delay explicitly named by the error (e.g. a rate-limit header).
    /// `None` leaves the caller free to apply its own backoff.
    fn retry_after(&self) -> Option<Duration>;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Store(e) => e.is_retryable(),
            CoreError::RuntimeApi(e) => e.is_retryable(),
            CoreError::Llm(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            // Missing preconditions cannot succeed on retry.
            CoreError::MissingState { .. } => false,
            CoreError::InvalidInput { .. } => false,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Store(e) => e.retry_after(),
            CoreError::RuntimeApi(e) => e.retry_after(),
            CoreError::Llm(e) => e.retry_after(),
            _ => None,
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Sql(sqlx::Error::PoolTimedOut)
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl ErrorExt for RuntimeApiError {
    fn log_error(&self) -> &Self {
        error!("RuntimeApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RuntimeApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            RuntimeApiError::ServerError { status_code } => *status_code >= 500,
            RuntimeApiError::RequestTimeout => true,
            RuntimeApiError::Unreachable { .. } => true,
            RuntimeApiError::InvalidResponse { .. } => true,
            // A rejected thread or run will be rejected again.
            RuntimeApiError::ThreadCreationFailed { .. } => false,
            RuntimeApiError::RunRejected { .. } => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimitExceeded { .. }
                | LlmError::ServiceUnavailable { .. }
                | LlmError::RequestTimeout { .. }
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimitExceeded { retry_after, .. } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ => None,
        }
    }
}
