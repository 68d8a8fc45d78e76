use serde::{Deserialize, Serialize};

/// Configuration for the capture client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Relay endpoint that receives finished clips
    pub relay_url: String,

    /// Sample rate for captured audio (Whisper expects 16kHz)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Advertise the custom model to the relay instead of the stock one
    pub use_custom_model: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://localhost:3001/api/transcribe".to_string(),
            sample_rate: 16000, // Whisper expects 16kHz
            channels: 1,        // Mono
            use_custom_model: false,
        }
    }
}
