use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use super::Transcriber;
use crate::config::UpstreamConfig;

/// Client for the hosted speech-to-text inference endpoint
pub struct HostedWhisper {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HostedWhisper {
    pub fn new(config: &UpstreamConfig) -> Self {
        if config.token.is_empty() {
            warn!("Upstream bearer token is empty; inference calls will be rejected");
        }

        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for HostedWhisper {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        // Uploads are forwarded under a fixed webm label regardless of what
        // the caller attached
        let part = Part::bytes(audio.to_vec())
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .context("failed to build multipart audio part")?;
        let form = Form::new().part("audio", part);

        debug!("Forwarding {} bytes to {}", audio.len(), self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .context("inference request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("inference endpoint error: {}", status);
        }

        let body: Value = response
            .json()
            .await
            .context("failed to parse inference response")?;

        Ok(extract_text(&body))
    }
}

/// Pull `text` out of the upstream JSON document.
///
/// The response shape is not under our control; a missing or non-string
/// `text` maps to the empty string instead of failing the request.
fn extract_text(body: &Value) -> String {
    body.get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
