use std::sync::Arc;

use async_trait::async_trait;

use crate::PostforgeError;

#[async_trait]
pub trait Runnable<Input: Send + 'static, Output: Send + 'static> {
    async fn invoke(&self, input: Input) -> Result<Output, PostforgeError>;
}

#[async_trait]
impl<Input, Output, R> Runnable<Input, Output> for Arc<R>
where
    Input: Send + 'static,
    Output: Send + 'static,
    R: Runnable<Input, Output> + Send + Sync + ?Sized,
{
    async fn invoke(&self, input: Input) -> Result<Output, PostforgeError> {
        self.as_ref().invoke(input).await
    }
}

pub trait RunnableExt<Input: Send + 'static, Output: Send + 'static>:
    Runnable<Input, Output> + Sized
{
    fn with_retry_policy(self, policy: crate::RetryPolicy) -> crate::Retrying<Self> {
        crate::Retrying::new(self, policy)
    }
}

impl<Input: Send + 'static, Output: Send + 'static, R> RunnableExt<Input, Output> for R where
    R: Runnable<Input, Output> + Sized
{
}
