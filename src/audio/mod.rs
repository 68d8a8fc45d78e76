pub mod backend;
pub mod encode;
pub mod file;
pub mod level;
pub mod microphone;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};
pub use file::AudioFile;
pub use level::LevelMeter;
