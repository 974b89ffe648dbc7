mod error;
mod llm;
mod retry;
mod runnable;

pub use error::{PostforgeError, ValidationError};
pub use llm::{LlmRequest, LlmResponse, Message, Role};
pub use retry::{is_retryable, Backoff, RetryPolicy, Retrying, Sleeper, TokioSleeper};
pub use runnable::{Runnable, RunnableExt};
