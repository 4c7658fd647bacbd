#![forbid(unsafe_code)]

mod client;
mod error;
mod retry;
mod timeout;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    retry::{DefaultRetryClassifier, DefaultRetryPolicy, RetryClassifier, RetryNet, RetryPolicyTrait},
    timeout::TimeoutNet,
    traits::{Net, NetExt},
    types::{Backoff, Headers, NetOptions, RetryPolicy},
};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::traits::NetMock;
