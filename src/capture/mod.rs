//! Capture client: device lifecycle, recording state, and the upload path
//!
//! This module provides the `CaptureController` abstraction that manages:
//! - Input device acquisition and release
//! - Recording start/stop and clip assembly
//! - Uploading finished clips to the relay
//! - The shared view state rendered by the display

pub mod config;
pub mod controller;
pub mod display;
pub mod stats;
pub mod uploader;
pub mod view;

pub use config::CaptureConfig;
pub use controller::{CaptureController, Clip};
pub use stats::CaptureStats;
pub use view::ViewState;
