use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use theatron_core::{ContentId, SessionId, UserId};
use theatron_net::Net;
use url::Url;

use crate::{
    error::SecurityError,
    result::{StepDetails, StepResult},
    step::StepKind,
};

/// Context shared by every step of one run. Later steps may rely on the
/// server having seen the earlier ones for this session.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub content_id: ContentId,
}

/// Executes a single validation step against the backend.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = CheckRunnerMock)
)]
#[async_trait]
pub trait CheckRunner: Send + Sync {
    async fn execute(
        &self,
        step: StepKind,
        ctx: &RunContext,
    ) -> Result<StepResult, SecurityError>;
}

/// Production runner posting each step to the validation endpoint.
pub struct HttpCheckRunner {
    net: Arc<dyn Net>,
    endpoint: Url,
}

impl HttpCheckRunner {
    pub fn new(net: Arc<dyn Net>, endpoint: Url) -> Self {
        Self { net, endpoint }
    }

    fn parse_response(body: Value) -> Result<StepResult, SecurityError> {
        let object = body
            .as_object()
            .ok_or_else(|| SecurityError::MalformedResponse("not an object".into()))?;

        let valid = object
            .get("valid")
            .and_then(Value::as_bool)
            .ok_or_else(|| SecurityError::MalformedResponse("missing `valid`".into()))?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut details =
            StepDetails::from_wire(object.get("details").cloned().unwrap_or(Value::Null));

        // Optional scanner output rides along inside the extension map.
        if let Some(scan_results) = object.get("scanResults") {
            details = match details {
                StepDetails::None => {
                    let mut extra = serde_json::Map::new();
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::Extra { extra }
                }
                StepDetails::Device { device_id, trusted, mut extra } => {
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::Device { device_id, trusted, extra }
                }
                StepDetails::Geo { country, allowed, mut extra } => {
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::Geo { country, allowed, extra }
                }
                StepDetails::Fraud { ip_reputation, behavior, mut extra } => {
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::Fraud { ip_reputation, behavior, extra }
                }
                StepDetails::ContentRating { required, actual, mut extra } => {
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::ContentRating { required, actual, extra }
                }
                StepDetails::Extra { mut extra } => {
                    extra.insert("scan_results".into(), scan_results.clone());
                    StepDetails::Extra { extra }
                }
            };
        }

        Ok(StepResult {
            valid,
            message,
            details,
        })
    }
}

#[async_trait]
impl CheckRunner for HttpCheckRunner {
    async fn execute(
        &self,
        step: StepKind,
        ctx: &RunContext,
    ) -> Result<StepResult, SecurityError> {
        let body = json!({
            "step": step,
            "sessionId": ctx.session_id,
            "userId": &ctx.user_id,
            "contentId": &ctx.content_id,
        });

        let response = self.net.post_json(self.endpoint.clone(), body, None).await?;
        Self::parse_response(response)
    }
}
