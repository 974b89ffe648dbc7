use postforge_core::{
    LlmRequest, LlmResponse, PostforgeError, RetryPolicy, Retrying, Runnable, RunnableExt, Sleeper,
    TokioSleeper,
};
use postforge_prompt::{parse_generation, ComposedPrompt, GenerationResult};
use tracing::Instrument;

use crate::Llm;

pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_MAX_TOKENS: u32 = 700;

/// Sends a composed prompt to the provider under a retry policy and parses
/// the reply. Only call failures are retried; parsing degrades instead.
pub struct PostGenerator<L, S = TokioSleeper> {
    llm: Retrying<L, S>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl<L> PostGenerator<L>
where
    L: Llm + Send + Sync,
{
    pub fn new(llm: L) -> Self {
        Self {
            llm: llm.with_retry_policy(RetryPolicy::default()),
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl<L, S> PostGenerator<L, S>
where
    L: Llm + Send + Sync,
    S: Sleeper,
{
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.llm = self.llm.with_policy(policy);
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> PostGenerator<L, S2> {
        PostGenerator {
            llm: self.llm.with_sleeper(sleeper),
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn request_for(&self, prompt: &ComposedPrompt) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            messages: prompt.to_messages(),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }

    pub async fn generate(
        &self,
        prompt: &ComposedPrompt,
    ) -> Result<GenerationResult, PostforgeError> {
        let request = self.request_for(prompt);
        let span = tracing::info_span!(
            "generate_post",
            max_attempts = self.llm.policy().max_attempts,
            degraded = tracing::field::Empty,
        );

        async move {
            let response: LlmResponse = self.llm.invoke(request).await?;
            let result = parse_generation(&response.content);
            tracing::Span::current().record("degraded", result.is_degraded());
            if result.is_degraded() {
                tracing::warn!(
                    raw_len = response.content.len(),
                    "provider response did not follow the post format; returning raw text"
                );
            }
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

#[async_trait::async_trait]
impl<L, S> Runnable<ComposedPrompt, GenerationResult> for PostGenerator<L, S>
where
    L: Llm + Send + Sync,
    S: Sleeper,
{
    async fn invoke(&self, input: ComposedPrompt) -> Result<GenerationResult, PostforgeError> {
        self.generate(&input).await
    }
}
