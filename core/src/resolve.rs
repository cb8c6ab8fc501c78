//! The response-resolution pipeline.
//!
//! # Design
//! Resolution runs in two strictly ordered stages:
//!
//! 1. **Response stage.** With an `on_response` hook, the raw response goes
//!    straight to the hook and its result is the stage output; classification
//!    and parsing are skipped. Without it, the response is classified and the
//!    body extracted.
//! 2. **Data stage.** With an `on_data` hook, the stage-one output goes
//!    through the hook; otherwise it is the final result unchanged.
//!
//! Any error from either stage is handed to `on_catch` when one is
//! configured, and its result becomes the final result. Without `on_catch`
//! the error reaches the caller. Each hook runs at most once per call.

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::HttpResponse;

/// Status text that marks a body-less success regardless of the body.
pub const NO_CONTENT: &str = "No Content";

/// Turn a classified response into its payload.
///
/// - absent response or `"No Content"` status text: `None`
/// - empty body: `Some(Value::Null)`
/// - anything else is parsed as JSON; a parse failure is returned as is
pub fn extract_data(response: Option<HttpResponse>) -> ApiResult {
    let Some(response) = response else {
        return Ok(None);
    };
    if response.status_text == NO_CONTENT {
        return Ok(None);
    }
    if response.body.is_empty() {
        return Ok(Some(serde_json::Value::Null));
    }
    Ok(Some(serde_json::from_str(&response.body)?))
}

#[derive(Debug, Clone, Default)]
pub struct ResponseResolver {
    config: ClientConfig,
}

impl ResponseResolver {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run both stages, then route any failure through `on_catch`.
    pub async fn resolve(&self, response: Option<HttpResponse>) -> ApiResult {
        let outcome = self.run_stages(response).await;
        self.recover(outcome).await
    }

    /// Hand a failed outcome to `on_catch` when configured; pass everything
    /// else through.
    pub async fn recover(&self, outcome: ApiResult) -> ApiResult {
        match (outcome, &self.config.on_catch) {
            (Err(err), Some(on_catch)) => {
                tracing::debug!("routing pipeline error to on_catch: {err}");
                on_catch(err).await
            }
            (outcome, _) => outcome,
        }
    }

    async fn run_stages(&self, response: Option<HttpResponse>) -> ApiResult {
        let data = match &self.config.on_response {
            Some(on_response) => on_response(response).await?,
            None => extract_data(classify(response)?)?,
        };
        match &self.config.on_data {
            Some(on_data) => on_data(data).await,
            None => Ok(data),
        }
    }
}
