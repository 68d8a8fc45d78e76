use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use tracing::{error, info};

use super::config::CaptureConfig;
use super::controller::Clip;
use super::view::ViewState;
use crate::relay::TranscribeResponse;

/// Transcript shown when the relay call fails for any reason
pub const TRANSCRIBE_FAILED: &str = "Error transcribing audio";

const MODEL_CUSTOM: &str = "custom";
const MODEL_STOCK: &str = "whisper-small";

/// Send one clip to the relay and publish the outcome into the view state.
///
/// A single best-effort call: no retries, no timeout, no cancellation. The
/// processing flag is set before the request and cleared once the call
/// settles on either path.
pub async fn send_clip(
    http: &reqwest::Client,
    config: &CaptureConfig,
    clip: Clip,
    view: &ViewState,
) {
    view.set_processing(true);

    let model = if config.use_custom_model {
        MODEL_CUSTOM
    } else {
        MODEL_STOCK
    };

    match request_transcript(http, &config.relay_url, clip, model).await {
        Ok(text) => {
            info!("Transcript received ({} chars)", text.len());
            view.set_transcript(text);
        }
        Err(e) => {
            error!("Error sending clip to relay: {:#}", e);
            view.set_transcript(TRANSCRIBE_FAILED);
        }
    }

    view.set_processing(false);
}

async fn request_transcript(
    http: &reqwest::Client,
    relay_url: &str,
    clip: Clip,
    model: &str,
) -> Result<String> {
    let part = Part::bytes(clip.wav)
        .file_name("recording.wav")
        .mime_str("audio/wav")
        .context("failed to build multipart audio part")?;
    let form = Form::new()
        .part("audio", part)
        .text("model", model.to_string());

    let response = http
        .post(relay_url)
        .multipart(form)
        .send()
        .await
        .context("relay request failed")?;

    if !response.status().is_success() {
        bail!("Transcription failed: relay returned {}", response.status());
    }

    let body: TranscribeResponse = response
        .json()
        .await
        .context("failed to parse relay response")?;

    Ok(body.text)
}
