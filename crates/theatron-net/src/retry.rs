use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::sleep;
use url::Url;

use crate::{
    error::NetError,
    traits::Net,
    types::{Headers, RetryPolicy},
};

#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = RetryClassifierMock)
)]
pub trait RetryClassifier {
    fn should_retry(&self, error: &NetError) -> bool;
}

#[derive(Default)]
pub struct DefaultRetryClassifier;

impl DefaultRetryClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl RetryClassifier for DefaultRetryClassifier {
    fn should_retry(&self, error: &NetError) -> bool {
        error.is_retryable()
    }
}

pub struct DefaultRetryPolicy {
    classifier: DefaultRetryClassifier,
    policy: RetryPolicy,
}

impl DefaultRetryPolicy {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            classifier: DefaultRetryClassifier,
            policy,
        }
    }
}

#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = RetryPolicyMock)
)]
pub trait RetryPolicyTrait: Send + Sync {
    fn should_retry(&self, error: &NetError, attempt: u32) -> bool;
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
    fn max_attempts(&self) -> u32;
}

impl RetryPolicyTrait for DefaultRetryPolicy {
    fn should_retry(&self, error: &NetError, attempt: u32) -> bool {
        if attempt >= self.policy.max_attempts {
            return false;
        }
        self.classifier.should_retry(error)
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.policy.delay_for_attempt(attempt)
    }

    fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }
}

/// Retry decorator for Net implementations.
pub struct RetryNet<N, P> {
    inner: N,
    retry_policy: P,
}

impl<N: Net, P: RetryPolicyTrait> RetryNet<N, P> {
    pub fn new(inner: N, retry_policy: P) -> Self {
        Self {
            inner,
            retry_policy,
        }
    }

    async fn run<F, Fut>(&self, mut call: F) -> Result<Value, NetError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Value, NetError>> + Send,
    {
        let mut last_error = None;

        for attempt in 0..=self.retry_policy.max_attempts() {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !self.retry_policy.should_retry(&error, attempt) {
                        return Err(error);
                    }
                    tracing::debug!(attempt, error = %error, "request failed, retrying");
                    last_error = Some(error);

                    if attempt < self.retry_policy.max_attempts() {
                        let delay = self.retry_policy.delay_for_attempt(attempt + 1);
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(NetError::RetryExhausted {
            max_attempts: self.retry_policy.max_attempts(),
            source: Box::new(last_error.unwrap_or(NetError::Timeout)),
        })
    }
}

#[async_trait]
impl<N: Net, P: RetryPolicyTrait> Net for RetryNet<N, P> {
    async fn get_json(&self, url: Url, headers: Option<Headers>) -> Result<Value, NetError> {
        self.run(|| self.inner.get_json(url.clone(), headers.clone()))
            .await
    }

    async fn post_json(
        &self,
        url: Url,
        body: Value,
        headers: Option<Headers>,
    ) -> Result<Value, NetError> {
        self.run(|| self.inner.post_json(url.clone(), body.clone(), headers.clone()))
            .await
    }
}
