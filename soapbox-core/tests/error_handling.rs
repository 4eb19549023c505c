use soapbox_core::{
    ConfigError, CoreError, ErrorExt, LlmError, NotifyError, RuntimeApiError, StoreError,
};
use std::time::Duration;

#[test]
fn test_error_display_includes_context() {
    let store_error = CoreError::Store(StoreError::Unavailable {
        reason: "connection refused".to_string(),
    });
    assert!(store_error.to_string().contains("connection refused"));

    let run_error = CoreError::RuntimeApi(RuntimeApiError::RunRejected {
        job: "generate_post".to_string(),
        status_code: 422,
    });
    assert!(run_error.to_string().contains("generate_post"));
    assert!(run_error.to_string().contains("422"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "SOAPBOX_API_URL".to_string(),
    });
    assert!(config_error.to_string().contains("SOAPBOX_API_URL"));
}

#[test]
fn test_retryable_errors() {
    let retryable = CoreError::RuntimeApi(RuntimeApiError::ServerError { status_code: 502 });
    assert!(retryable.is_retryable());

    let non_retryable = CoreError::Config(ConfigError::MissingField {
        field: "urls".to_string(),
    });
    assert!(!non_retryable.is_retryable());

    // Input errors are fatal to the current job by design.
    let input_error = CoreError::MissingState {
        what: "report".to_string(),
    };
    assert!(!input_error.is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limited = CoreError::Llm(LlmError::RateLimitExceeded {
        provider: "groq".to_string(),
        retry_after: 60,
    });
    assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

    let window_overflow = CoreError::Llm(LlmError::WindowOverflow {
        estimated_tokens: 9000,
        budget: 6000,
    });
    assert_eq!(window_overflow.retry_after(), None);
}

#[test]
fn test_notify_errors_wrap_into_core() {
    let err: CoreError = NotifyError::SendFailed {
        reason: "channel_not_found".to_string(),
        status_code: Some(404),
    }
    .into();
    assert!(matches!(err, CoreError::Notify(_)));
    assert!(!err.is_retryable());
}
