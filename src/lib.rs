pub mod audio;
pub mod capture;
pub mod config;
pub mod relay;
pub mod upstream;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame, LevelMeter,
};
pub use capture::{CaptureConfig, CaptureController, CaptureStats, Clip, ViewState};
pub use config::Config;
pub use relay::{create_router, AppState, TranscribeResponse};
pub use upstream::{HostedWhisper, Transcriber};
