use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Shared view state: written by the capture controller and the uploader,
/// read by the display. Holds exactly what the capture client shows the
/// user (recording flag, processing flag, latest transcript, input level).
#[derive(Clone, Default)]
pub struct ViewState {
    inner: Arc<ViewInner>,
}

#[derive(Default)]
struct ViewInner {
    recording: AtomicBool,
    processing: AtomicBool,
    transcript: Mutex<String>,
    level_bits: AtomicU32,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.recording.load(Ordering::SeqCst)
    }

    pub fn set_recording(&self, on: bool) {
        self.inner.recording.store(on, Ordering::SeqCst);
    }

    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::SeqCst)
    }

    pub fn set_processing(&self, on: bool) {
        self.inner.processing.store(on, Ordering::SeqCst);
    }

    pub fn transcript(&self) -> String {
        self.inner
            .transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_transcript(&self, text: impl Into<String>) {
        *self
            .inner
            .transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = text.into();
    }

    /// Latest input level (RMS, 0.0 to 1.0), the live preview value
    pub fn level(&self) -> f32 {
        f32::from_bits(self.inner.level_bits.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: f32) {
        self.inner.level_bits.store(level.to_bits(), Ordering::Relaxed);
    }
}
