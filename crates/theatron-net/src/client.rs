use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::Net,
    types::{Headers, NetOptions},
};

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        let inner = Client::builder()
            .build()
            .expect("failed to build reqwest client");
        Self { inner, options }
    }

    fn apply_headers(
        mut req: reqwest::RequestBuilder,
        headers: Option<Headers>,
    ) -> reqwest::RequestBuilder {
        if let Some(headers) = headers {
            for (k, v) in headers.iter() {
                req = req.header(k, v);
            }
        }
        req
    }

    async fn parse_json(url: &Url, resp: reqwest::Response) -> NetResult<Value> {
        let status = resp.status();
        if !status.is_success() {
            return Err(NetError::http_status(status.as_u16(), url.as_str()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| NetError::InvalidBody(e.to_string()))
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn get_json(&self, url: Url, headers: Option<Headers>) -> Result<Value, NetError> {
        let req = self.inner.get(url.clone());
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        Self::parse_json(&url, resp).await
    }

    async fn post_json(
        &self,
        url: Url,
        body: Value,
        headers: Option<Headers>,
    ) -> Result<Value, NetError> {
        let req = self.inner.post(url.clone()).json(&body);
        let req = Self::apply_headers(req, headers);
        let req = req.timeout(self.options.request_timeout);

        let resp = req.send().await.map_err(NetError::from)?;
        Self::parse_json(&url, resp).await
    }
}
