use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::NetError;
use crate::retry::{DefaultRetryPolicy, RetryNet};
use crate::timeout::TimeoutNet;
use crate::types::{Headers, RetryPolicy};

/// JSON-speaking HTTP seam.
///
/// The watch session only ever exchanges JSON documents (content metadata,
/// validation step results), so the seam is narrower than a generic byte
/// transport.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = NetMock)
)]
#[async_trait]
pub trait Net: Send + Sync {
    /// Fetch a JSON document.
    async fn get_json(&self, url: Url, headers: Option<Headers>) -> Result<Value, NetError>;

    /// Post a JSON body and parse the JSON response.
    async fn post_json(
        &self,
        url: Url,
        body: Value,
        headers: Option<Headers>,
    ) -> Result<Value, NetError>;
}

pub trait NetExt: Net + Sized {
    /// Add timeout layer.
    fn with_timeout(self, timeout: Duration) -> TimeoutNet<Self> {
        TimeoutNet::new(self, timeout)
    }

    /// Add retry layer.
    fn with_retry(self, policy: RetryPolicy) -> RetryNet<Self, DefaultRetryPolicy> {
        RetryNet::new(self, DefaultRetryPolicy::new(policy))
    }
}

impl<T: Net> NetExt for T {}
