use crate::LlmProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use soapbox_core::{ConfigError, CoreError, LlmError};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// [`LlmProvider`] backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionProvider {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Reads `LLM_API_KEY` and `LLM_MODEL` (required) and `LLM_API_URL`
    /// (optional, Groq-compatible default).
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = require_env("LLM_API_KEY")?;
        let model = require_env("LLM_MODEL")?;
        let base_url =
            std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(base_url, api_key, model))
    }

    fn provider_name(&self) -> String {
        self.base_url.clone()
    }
}

fn require_env(var_name: &str) -> Result<String, CoreError> {
    std::env::var(var_name).map_err(|_| {
        CoreError::Config(ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        })
    })
}

fn retry_after_seconds(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

#[async_trait]
impl LlmProvider for ChatCompletionProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        debug!(model = %self.model, prompt_chars = user_prompt.len(), "Requesting completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: self.provider_name(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion request failed");
            let err = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LlmError::AuthenticationFailed {
                        provider: self.provider_name(),
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded {
                    provider: self.provider_name(),
                    retry_after: retry_after_seconds(&response),
                },
                s if s.is_server_error() => LlmError::ServiceUnavailable {
                    provider: self.provider_name(),
                },
                _ => LlmError::InvalidResponseFormat {
                    provider: self.provider_name(),
                },
            };
            return Err(err.into());
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|_| {
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: self.provider_name(),
            })
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: self.provider_name(),
                })
            })?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_system_then_user_message() {
        let body = ChatCompletionBody {
            model: "llama-3.3-70b",
            temperature: 0.5,
            messages: [
                ChatMessage {
                    role: "system",
                    content: "summarize",
                },
                ChatMessage {
                    role: "user",
                    content: "chunk text",
                },
            ],
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "chunk text");
    }

    #[test]
    fn response_parsing_takes_the_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"a report"}},{"message":{"content":"ignored"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "a report");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = ChatCompletionProvider::new("https://api.example.com/v1/", "key", "model");
        assert_eq!(provider.base_url, "https://api.example.com/v1");
    }
}
