mod generator;
pub mod openai_compatible;

pub use generator::{PostGenerator, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use openai_compatible::{
    ChatCompletionRequest, OpenAiCompatibleBuilder, OpenAiCompatibleClient,
};
pub use postforge_core::{LlmRequest, LlmResponse, Message, Role};

use postforge_core::Runnable;

pub trait Llm: Runnable<LlmRequest, LlmResponse> {}

impl<T> Llm for T where T: Runnable<LlmRequest, LlmResponse> {}
