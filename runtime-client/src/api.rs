use crate::retry::{RetryConfig, RetryExecutor};
use crate::{JobRuntime, RunRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use soapbox_core::{ConfigError, CoreError, RunConfigurable, RuntimeApiError};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
struct ThreadCreated {
    thread_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RunCreated {
    run_id: String,
}

#[derive(Debug, Serialize)]
struct CreateRunBody<'a> {
    assistant_id: &'a str,
    input: &'a serde_json::Value,
    config: RunConfigBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
struct RunConfigBody<'a> {
    configurable: &'a RunConfigurable,
}

/// HTTP client for the external job runtime.
///
/// The runtime exposes two endpoints the scheduler cares about:
/// `POST /threads` and `POST /threads/{thread_id}/runs`. Transient failures
/// are retried with backoff before a creation is reported as failed.
#[derive(Debug)]
pub struct RuntimeApiClient {
    http_client: Client,
    base_url: String,
    retry: RetryExecutor,
}

impl RuntimeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .user_agent(concat!("soapbox/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryExecutor::new(RetryConfig::runtime()),
        }
    }

    /// Reads the runtime endpoint from `SOAPBOX_API_URL`.
    pub fn from_env() -> Result<Self, CoreError> {
        let base_url = std::env::var("SOAPBOX_API_URL").map_err(|_| {
            CoreError::Config(ConfigError::MissingEnvironmentVariable {
                var_name: "SOAPBOX_API_URL".to_string(),
            })
        })?;
        Ok(Self::new(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            RuntimeApiError::RequestTimeout.into()
        } else if e.is_connect() {
            RuntimeApiError::Unreachable {
                endpoint: self.base_url.clone(),
            }
            .into()
        } else {
            CoreError::Network(e)
        }
    }

    async fn create_thread_once(&self) -> Result<String, CoreError> {
        let url = format!("{}/threads", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            let created: ThreadCreated = response.json().await.map_err(|e| {
                CoreError::RuntimeApi(RuntimeApiError::InvalidResponse {
                    details: e.to_string(),
                })
            })?;
            debug!(thread_id = %created.thread_id, "Created thread");
            Ok(created.thread_id)
        } else {
            Err(thread_error(status).into())
        }
    }

    async fn create_run_once(
        &self,
        thread_id: &str,
        job_name: &str,
        request: &RunRequest,
    ) -> Result<String, CoreError> {
        let url = format!("{}/threads/{}/runs", self.base_url, thread_id);
        let request_id = Uuid::new_v4();

        let body = CreateRunBody {
            assistant_id: job_name,
            input: &request.input,
            config: RunConfigBody {
                configurable: &request.configurable,
            },
            after_seconds: request.after_seconds,
        };

        info!(
            %request_id,
            job_name,
            thread_id,
            after_seconds = ?request.after_seconds,
            "Submitting run"
        );

        let response = self
            .http_client
            .post(&url)
            .header("X-Request-Id", request_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            let created: RunCreated = response.json().await.map_err(|e| {
                CoreError::RuntimeApi(RuntimeApiError::InvalidResponse {
                    details: e.to_string(),
                })
            })?;
            debug!(run_id = %created.run_id, "Run accepted");
            Ok(created.run_id)
        } else {
            error!(job_name, status = status.as_u16(), "Run rejected");
            Err(run_error(status, job_name).into())
        }
    }
}

fn thread_error(status: StatusCode) -> RuntimeApiError {
    if status.is_server_error() {
        RuntimeApiError::ServerError {
            status_code: status.as_u16(),
        }
    } else {
        RuntimeApiError::ThreadCreationFailed {
            status_code: status.as_u16(),
        }
    }
}

fn run_error(status: StatusCode, job_name: &str) -> RuntimeApiError {
    if status.is_server_error() {
        RuntimeApiError::ServerError {
            status_code: status.as_u16(),
        }
    } else {
        RuntimeApiError::RunRejected {
            job: job_name.to_string(),
            status_code: status.as_u16(),
        }
    }
}

#[async_trait]
impl JobRuntime for RuntimeApiClient {
    async fn create_thread(&self) -> Result<String, CoreError> {
        self.retry
            .execute("create_thread", || self.create_thread_once())
            .await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        job_name: &str,
        request: RunRequest,
    ) -> Result<String, CoreError> {
        self.retry
            .execute("create_run", || {
                self.create_run_once(thread_id, job_name, &request)
            })
            .await
    }
}
