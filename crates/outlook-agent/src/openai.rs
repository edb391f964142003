//! Blocking OpenAI Responses client.

use crate::config::Settings;
use crate::endpoint::ResponsesEndpoint;
use crate::error::EndpointError;
use crate::responses::{ModelResponse, ResponsesRequest};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiResponsesClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiResponsesClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, EndpointError> {
        let mut builder = reqwest::blocking::Client::builder();
        // The blocking client defaults to a 30s timeout; reports routinely
        // run longer, so only set one when asked.
        builder = builder.timeout(timeout);
        let client = builder
            .build()
            .map_err(|e| EndpointError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, EndpointError> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or(EndpointError::MissingApiKey)?;
        Self::new(&settings.base_url, api_key, settings.http_timeout)
    }

    pub fn responses_url(&self) -> String {
        format!("{}/v1/responses", self.base_url)
    }
}

impl ResponsesEndpoint for OpenAiResponsesClient {
    fn create(&self, request: &ResponsesRequest) -> Result<ModelResponse, EndpointError> {
        let url = self.responses_url();
        debug!(
            model = %request.model,
            input_items = request.input.len(),
            tools = request.tools.len(),
            "POST {url}"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| EndpointError::Transport(format!("failed to reach openai at {url}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(EndpointError::Http { status, body });
        }

        let body: serde_json::Value = resp
            .json()
            .map_err(|e| EndpointError::InvalidResponse(format!("openai returned invalid JSON: {e}")))?;
        ModelResponse::from_json(&body)
    }
}
