use std::sync::atomic::{AtomicU16, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::config::CaptureConfig;
use super::stats::CaptureStats;
use super::uploader;
use super::view::ViewState;
use crate::audio::{encode, AudioBackend, AudioBackendConfig, AudioBackendFactory, LevelMeter};

/// A finished recording, assembled from buffered frames
pub struct Clip {
    /// Clip identifier, used in logs
    pub id: String,
    /// WAV-encoded audio bytes
    pub wav: Vec<u8>,
    /// Length of the recorded audio
    pub duration_secs: f64,
}

impl Clip {
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self> {
        let duration_secs = samples.len() as f64 / (sample_rate as f64 * channels as f64).max(1.0);
        let wav = encode::wav_bytes(&samples, sample_rate, channels)
            .context("failed to encode clip")?;

        Ok(Self {
            id: format!("clip-{}", Uuid::new_v4()),
            wav,
            duration_secs,
        })
    }
}

/// Manages the input device lifecycle and recording state for one capture
/// client.
///
/// Frames flow from the backend continuously while the device is acquired,
/// driving the level preview; they are buffered into a clip only while the
/// recording flag is set. At most one recording is active at a time, and
/// starting a new one discards any prior unflushed buffer.
pub struct CaptureController {
    config: CaptureConfig,
    view: ViewState,
    backend: Mutex<Option<Box<dyn AudioBackend>>>,
    drain_task: Mutex<Option<JoinHandle<()>>>,
    clip_buffer: Arc<Mutex<Vec<i16>>>,
    frame_rate: Arc<AtomicU32>,
    frame_channels: Arc<AtomicU16>,
    clips_recorded: AtomicUsize,
    started_at: Mutex<Option<DateTime<Utc>>>,
    http: reqwest::Client,
}

impl CaptureController {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            view: ViewState::new(),
            backend: Mutex::new(None),
            drain_task: Mutex::new(None),
            clip_buffer: Arc::new(Mutex::new(Vec::new())),
            frame_rate: Arc::new(AtomicU32::new(config.sample_rate)),
            frame_channels: Arc::new(AtomicU16::new(config.channels)),
            clips_recorded: AtomicUsize::new(0),
            started_at: Mutex::new(None),
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Shared state read by the display
    pub fn view(&self) -> ViewState {
        self.view.clone()
    }

    /// Request access to the default input device and start the preview.
    ///
    /// On failure the error is returned with state unchanged; there is no
    /// retry.
    pub async fn acquire_devices(&self) -> Result<()> {
        let backend_config = AudioBackendConfig {
            target_sample_rate: self.config.sample_rate,
            target_channels: self.config.channels,
            ..AudioBackendConfig::default()
        };

        let backend = AudioBackendFactory::create(backend_config)
            .context("failed to create audio backend")?;

        self.attach_backend(backend).await
    }

    /// Start an already-constructed backend and begin draining its frames.
    ///
    /// `acquire_devices` goes through here; tests attach scripted backends
    /// directly.
    pub async fn attach_backend(&self, mut backend: Box<dyn AudioBackend>) -> Result<()> {
        let mut slot = self.backend.lock().await;
        if slot.is_some() {
            warn!("Input device already acquired");
            return Ok(());
        }

        let mut frames = backend
            .start()
            .await
            .context("failed to start audio capture")?;

        let view = self.view.clone();
        let buffer = Arc::clone(&self.clip_buffer);
        let frame_rate = Arc::clone(&self.frame_rate);
        let frame_channels = Arc::clone(&self.frame_channels);
        let mut meter = LevelMeter::new(self.config.sample_rate);

        let task = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                frame_rate.store(frame.sample_rate, Ordering::Relaxed);
                frame_channels.store(frame.channels, Ordering::Relaxed);

                for &sample in &frame.samples {
                    if let Some(level) = meter.push(sample) {
                        view.set_level(level);
                    }
                }

                if view.is_recording() {
                    let mut buf = buffer.lock().await;
                    buf.extend_from_slice(&frame.samples);
                }
            }
        });

        info!("Input device acquired ({})", backend.name());

        *self.drain_task.lock().await = Some(task);
        *slot = Some(backend);

        Ok(())
    }

    /// Stop the input stream and clear the preview; idempotent
    pub async fn release_devices(&self) -> Result<()> {
        let mut slot = self.backend.lock().await;
        let Some(mut backend) = slot.take() else {
            return Ok(());
        };

        backend
            .stop()
            .await
            .context("failed to stop audio backend")?;

        // The backend dropped its sender, so the drain task ends on its own
        if let Some(task) = self.drain_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Frame drain task panicked: {}", e);
            }
        }

        self.view.set_level(0.0);

        info!("Input device released");

        Ok(())
    }

    /// Begin buffering frames into a new clip; no-op without a device
    pub async fn start_recording(&self) {
        if self.backend.lock().await.is_none() {
            warn!("No input device acquired; ignoring start request");
            return;
        }
        if self.view.is_recording() {
            warn!("Recording already started");
            return;
        }

        self.clip_buffer.lock().await.clear();
        *self.started_at.lock().await = Some(Utc::now());
        self.view.set_recording(true);

        info!("Recording started");
    }

    /// Stop buffering, assemble the clip, and hand it to the uploader.
    ///
    /// The recording flag clears immediately; the upload settles in the
    /// background and clears the processing flag when done.
    pub async fn stop_recording(&self) {
        if !self.view.is_recording() {
            warn!("Recording not active");
            return;
        }

        self.view.set_recording(false);

        let samples = {
            let mut buf = self.clip_buffer.lock().await;
            std::mem::take(&mut *buf)
        };
        let started = self.started_at.lock().await.take();

        let sample_rate = self.frame_rate.load(Ordering::Relaxed);
        let channels = self.frame_channels.load(Ordering::Relaxed);

        let clip = match Clip::from_samples(samples, sample_rate, channels) {
            Ok(clip) => clip,
            Err(e) => {
                error!("Failed to assemble clip: {:#}", e);
                return;
            }
        };

        self.clips_recorded.fetch_add(1, Ordering::SeqCst);

        if let Some(started) = started {
            let elapsed = Utc::now().signed_duration_since(started);
            info!(
                "Recording stopped: {} ({:.1}s of audio after {:.1}s)",
                clip.id,
                clip.duration_secs,
                elapsed.num_milliseconds() as f64 / 1000.0
            );
        }

        // Flag flips before the upload is in flight so the display shows
        // the processing indicator without waiting for the spawned task
        self.view.set_processing(true);

        let http = self.http.clone();
        let config = self.config.clone();
        let view = self.view.clone();

        tokio::spawn(async move {
            uploader::send_clip(&http, &config, clip, &view).await;
        });
    }

    /// Current session statistics
    pub async fn stats(&self) -> CaptureStats {
        CaptureStats {
            is_recording: self.view.is_recording(),
            is_processing: self.view.is_processing(),
            started_at: *self.started_at.lock().await,
            clips_recorded: self.clips_recorded.load(Ordering::SeqCst),
        }
    }
}
