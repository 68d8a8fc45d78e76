use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time statistics for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Whether a recording is currently active
    pub is_recording: bool,

    /// Whether a clip is out for transcription
    pub is_processing: bool,

    /// When the active recording started, if any
    pub started_at: Option<DateTime<Utc>>,

    /// Number of clips recorded this session
    pub clips_recorded: usize,
}
