use std::time::Duration;

use async_trait::async_trait;

use crate::{PostforgeError, Runnable};

/// Delay schedule applied between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    None,
    Fixed(Duration),
    /// `step × n` before attempt `n + 1`.
    Linear(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
    pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(800);

    pub fn new(max_attempts: usize, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Wait applied after `attempt` (1-based) failed and before the next one.
    pub fn delay_before_next(&self, attempt: usize) -> Duration {
        match self.backoff {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Linear(step) => step.saturating_mul(attempt as u32),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_ATTEMPTS,
            Backoff::Linear(Self::DEFAULT_BACKOFF_STEP),
        )
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub fn is_retryable(error: &PostforgeError) -> bool {
    matches!(
        error,
        PostforgeError::LlmProvider(_) | PostforgeError::Timeout(_)
    )
}

pub struct Retrying<R, S = TokioSleeper> {
    runnable: R,
    policy: RetryPolicy,
    sleeper: S,
}

impl<R> Retrying<R> {
    pub fn new(runnable: R, policy: RetryPolicy) -> Self {
        Self {
            runnable,
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl<R, S> Retrying<R, S> {
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Retrying<R, S2> {
        Retrying {
            runnable: self.runnable,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl<Input, Output, R, S> Runnable<Input, Output> for Retrying<R, S>
where
    Input: Send + Clone + 'static,
    Output: Send + 'static,
    R: Runnable<Input, Output> + Send + Sync,
    S: Sleeper,
{
    async fn invoke(&self, input: Input) -> Result<Output, PostforgeError> {
        let max_attempts = self.policy.max_attempts;
        if max_attempts == 0 {
            return Err(PostforgeError::InvalidConfig(
                "retry policy must allow at least one attempt".to_string(),
            ));
        }

        let mut attempt = 1;
        loop {
            let error = match self.runnable.invoke(input.clone()).await {
                Ok(output) => return Ok(output),
                Err(error) => error,
            };

            if !is_retryable(&error) {
                return Err(error);
            }

            if attempt == max_attempts {
                tracing::warn!(attempt, max_attempts, error = %error, "giving up after final attempt");
                return Err(PostforgeError::GenerationFailed {
                    attempts: attempt,
                    source: Box::new(error),
                });
            }

            let delay = self.policy.delay_before_next(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "attempt failed; backing off"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
