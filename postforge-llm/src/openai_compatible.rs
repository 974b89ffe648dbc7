//! Generic OpenAI-compatible LLM client
//!
//! Speaks the `/v1/chat/completions` format, so it works against OpenAI and
//! any provider or proxy that mirrors it.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use postforge_core::{LlmRequest, LlmResponse, Message, PostforgeError, Runnable};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Request body for chat completions endpoint
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Non-streaming response from chat completions
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI-style error response
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiError {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    base_url: Url,
    api_key: SecretString,
    default_model: String,
    timeout: Duration,
    http: Client,
}

impl fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    fn map_transport_error(&self, err: reqwest::Error) -> PostforgeError {
        if err.is_timeout() {
            PostforgeError::Timeout(self.timeout)
        } else {
            PostforgeError::LlmProvider(err.to_string())
        }
    }
}

#[derive(Default)]
pub struct OpenAiCompatibleBuilder {
    base_url: Option<Url>,
    api_key: Option<SecretString>,
    default_model: Option<String>,
    timeout: Option<Duration>,
}

impl fmt::Debug for OpenAiCompatibleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("OpenAiCompatibleBuilder")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &api_key)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleBuilder {
    pub fn base_url(mut self, value: impl AsRef<str>) -> Result<Self, PostforgeError> {
        let url = Url::parse(value.as_ref())
            .map_err(|err| PostforgeError::InvalidConfig(format!("invalid base url: {err}")))?;
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.api_key = if value.trim().is_empty() {
            None
        } else {
            Some(SecretString::new(value))
        };
        self
    }

    pub fn default_model(mut self, value: impl Into<String>) -> Self {
        self.default_model = Some(value.into());
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, PostforgeError> {
        let api_key = self
            .api_key
            .ok_or_else(|| PostforgeError::InvalidConfig("missing provider API key".to_string()))?;
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(OPENAI_BASE_URL)
                .map_err(|err| PostforgeError::InvalidConfig(err.to_string()))?,
        };
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PostforgeError::InvalidConfig(err.to_string()))?;

        Ok(OpenAiCompatibleClient {
            base_url,
            api_key,
            default_model: self
                .default_model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout,
            http,
        })
    }
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for OpenAiCompatibleClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, PostforgeError> {
        let LlmRequest {
            model,
            messages,
            temperature,
            max_tokens,
        } = input;
        let model = if model.is_empty() {
            self.default_model.clone()
        } else {
            model
        };
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
            stream: false,
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            return Err(PostforgeError::LlmProvider(format!(
                "HTTP {}: {message}",
                status.as_u16()
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "chat completion usage"
            );
        }

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| PostforgeError::LlmProvider("empty completion".to_string()))?;

        Ok(LlmResponse { content })
    }
}
