use anyhow::Result;
use serde::Deserialize;

use crate::capture::CaptureConfig;

/// Default upstream inference endpoint (hosted whisper-small)
pub const DEFAULT_UPSTREAM_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-small";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub upstream: UpstreamConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Inference endpoint URL
    pub endpoint: String,
    /// Bearer credential for the upstream provider
    pub token: String,
}

impl Config {
    /// Load configuration: defaults, then an optional file, then
    /// QUICKSCRIBE-prefixed environment variables.
    ///
    /// `PORT` and `HUGGING_FACE_TOKEN` are honored directly from the
    /// process environment, matching the original deployment contract.
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("service.name", "quickscribe")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 3001_i64)?
            .set_default("upstream.endpoint", DEFAULT_UPSTREAM_ENDPOINT)?
            .set_default("upstream.token", "")?
            .set_default("capture.relay_url", "http://localhost:3001/api/transcribe")?
            .set_default("capture.sample_rate", 16000_i64)?
            .set_default("capture.channels", 1_i64)?
            .set_default("capture.use_custom_model", false)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("QUICKSCRIBE").separator("__"));

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("service.http.port", port)?;
        }
        if let Ok(token) = std::env::var("HUGGING_FACE_TOKEN") {
            builder = builder.set_override("upstream.token", token)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
