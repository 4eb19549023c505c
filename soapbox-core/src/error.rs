use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Job runtime error: {0}")]
    RuntimeApi(#[from] RuntimeApiError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Missing required state: {what}")]
    MissingState { what: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Write to bucket '{bucket}' failed: {reason}")]
    WriteFailed { bucket: String, reason: String },

    #[error("Stored data for bucket '{bucket}' is corrupt: {details}")]
    Corrupt { bucket: String, details: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum RuntimeApiError {
    #[error("Thread creation rejected with status {status_code}")]
    ThreadCreationFailed { status_code: u16 },

    #[error("Run creation for job '{job}' rejected with status {status_code}")]
    RunRejected { job: String, status_code: u16 },

    #[error("Job runtime unreachable at {endpoint}")]
    Unreachable { endpoint: String },

    #[error("Request to job runtime timed out")]
    RequestTimeout,

    #[error("Job runtime server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Invalid job runtime response: {details}")]
    InvalidResponse { details: String },
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Rate limit exceeded for {provider}. Retry after {retry_after} seconds")]
    RateLimitExceeded { provider: String, retry_after: u64 },

    #[error(
        "Chunk of ~{estimated_tokens} tokens cannot fit the {budget} tokens/minute budget at any split size"
    )]
    WindowOverflow { estimated_tokens: u64, budget: u64 },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification send failed: {reason}")]
    SendFailed {
        reason: String,
        status_code: Option<u16>,
    },

    #[error("Notification channel not configured: {what}")]
    NotConfigured { what: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },
}
