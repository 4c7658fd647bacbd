use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::NetError;
use crate::traits::Net;
use crate::types::Headers;

/// Timeout decorator for Net implementations.
pub struct TimeoutNet<N> {
    inner: N,
    timeout: Duration,
}

impl<N: Net> TimeoutNet<N> {
    pub fn new(inner: N, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<N: Net> Net for TimeoutNet<N> {
    async fn get_json(&self, url: Url, headers: Option<Headers>) -> Result<Value, NetError> {
        tokio::time::timeout(self.timeout, self.inner.get_json(url, headers))
            .await
            .map_err(|_| NetError::timeout())?
    }

    async fn post_json(
        &self,
        url: Url,
        body: Value,
        headers: Option<Headers>,
    ) -> Result<Value, NetError> {
        tokio::time::timeout(self.timeout, self.inner.post_json(url, body, headers))
            .await
            .map_err(|_| NetError::timeout())?
    }
}
