use async_trait::async_trait;
use serde::Serialize;
use soapbox_core::{CoreError, RunConfigurable};

pub mod api;
pub mod retry;

pub use api::RuntimeApiClient;
pub use retry::{calculate_delay, RetryConfig, RetryExecutor};

/// Everything the job runtime needs to start one run: the payload handed to
/// the job, the configuration toggles forwarded verbatim, and an optional
/// delay before the run may begin executing.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub input: serde_json::Value,
    pub configurable: RunConfigurable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_seconds: Option<u64>,
}

impl RunRequest {
    pub fn new(input: serde_json::Value) -> Self {
        Self {
            input,
            configurable: RunConfigurable::default(),
            after_seconds: None,
        }
    }

    pub fn with_configurable(mut self, configurable: RunConfigurable) -> Self {
        self.configurable = configurable;
        self
    }

    pub fn with_after_seconds(mut self, after_seconds: u64) -> Self {
        self.after_seconds = Some(after_seconds);
        self
    }
}

/// Capability handle onto the external job runtime.
///
/// Submitting a run is fire-and-forget: success means the runtime accepted
/// the work, not that the job completed. The scheduling core only ever
/// passes the returned identifiers through for observability.
#[async_trait]
pub trait JobRuntime: Send + Sync {
    /// Creates a new logical thread and returns its id.
    async fn create_thread(&self) -> Result<String, CoreError>;

    /// Submits the named job on an existing thread and returns the run id.
    async fn create_run(
        &self,
        thread_id: &str,
        job_name: &str,
        request: RunRequest,
    ) -> Result<String, CoreError>;
}
