// Microphone capture backend built on cpal
//
// cpal streams are not Send, so the stream lives on a dedicated thread and is
// controlled through an atomic stop flag. Frames are pushed to the consumer
// over a bounded channel; overflow drops frames rather than blocking the
// audio callback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Microphone audio backend
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    stop_flag: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
    capturing: bool,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Result<Self> {
        // Surface a missing device at acquisition time, before any
        // recording is attempted
        if cpal::default_host().default_input_device().is_none() {
            bail!("no default input device available");
        }

        info!(
            "Microphone backend initialized ({}Hz, {} channels)",
            config.target_sample_rate, config.target_channels
        );

        Ok(Self {
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
            capturing: false,
        })
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing {
            bail!("Already capturing");
        }

        let (frames_tx, frames_rx) = mpsc::channel(256);
        let (ready_tx, ready_rx) = oneshot::channel();

        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);
        let config = self.config.clone();

        let worker = std::thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || run_capture(config, frames_tx, ready_tx, stop_flag))
            .context("failed to spawn capture thread")?;

        let device_name = ready_rx
            .await
            .map_err(|_| anyhow!("capture thread exited before reporting readiness"))??;

        self.worker = Some(worker);
        self.capturing = true;

        info!("Microphone capture started on '{}'", device_name);

        Ok(frames_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.capturing {
            return Ok(());
        }

        info!("Stopping microphone capture");

        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || worker.join())
                .await
                .context("capture thread join task failed")?
                .map_err(|_| anyhow!("capture thread panicked"))?;
        }

        self.capturing = false;

        info!("Microphone capture stopped");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        // The capture thread parks on this flag; raise it so the thread
        // exits even when stop() was never called
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// Own the cpal stream for the lifetime of one capture.
///
/// Runs on the dedicated capture thread; reports setup success or failure
/// once through `ready_tx`, then parks until the stop flag is raised.
fn run_capture(
    config: AudioBackendConfig,
    frames_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<Result<String>>,
    stop_flag: Arc<AtomicBool>,
) {
    let dropped = Arc::new(AtomicUsize::new(0));

    match open_stream(&config, frames_tx, Arc::clone(&dropped)) {
        Ok((stream, device_name)) => {
            if ready_tx.send(Ok(device_name)).is_err() {
                return;
            }

            while !stop_flag.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(50));
            }

            drop(stream);

            let dropped = dropped.load(Ordering::SeqCst);
            if dropped > 0 {
                warn!("Capture channel overflowed; {} frames dropped", dropped);
            }
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    }
}

fn open_stream(
    config: &AudioBackendConfig,
    frames_tx: mpsc::Sender<AudioFrame>,
    dropped: Arc<AtomicUsize>,
) -> Result<(cpal::Stream, String)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no default input device available"))?;
    let device_name = device.name().unwrap_or_else(|_| "unknown input".to_string());

    let supported = device
        .default_input_config()
        .context("failed to query input device configuration")?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.config();

    let stream = match sample_format {
        SampleFormat::F32 => {
            build_stream::<f32>(&device, &stream_config, config, frames_tx, dropped)?
        }
        SampleFormat::I16 => {
            build_stream::<i16>(&device, &stream_config, config, frames_tx, dropped)?
        }
        SampleFormat::U16 => {
            build_stream::<u16>(&device, &stream_config, config, frames_tx, dropped)?
        }
        other => bail!("unsupported input sample format: {:?}", other),
    };

    stream.play().context("failed to start input stream")?;

    Ok((stream, device_name))
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    config: &AudioBackendConfig,
    frames_tx: mpsc::Sender<AudioFrame>,
    dropped: Arc<AtomicUsize>,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let source_rate = stream_config.sample_rate.0;
    let source_channels = stream_config.channels;

    // Integer decimation toward the target rate; devices slower than the
    // target pass through at their native rate
    let ratio = (source_rate / config.target_sample_rate.max(1)).max(1);
    let effective_rate = source_rate / ratio;
    let to_mono = config.target_channels == 1 && source_channels == 2;
    let out_channels = if to_mono { 1 } else { source_channels };

    let mut sent_samples: u64 = 0;

    let stream = device
        .build_input_stream(
            stream_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut samples: Vec<i16> = Vec::with_capacity(data.len());
                for &sample in data {
                    let value: f32 = cpal::Sample::from_sample(sample);
                    samples.push((value * i16::MAX as f32) as i16);
                }

                if to_mono {
                    samples = stereo_to_mono(&samples);
                }
                if ratio > 1 {
                    samples = decimate(&samples, ratio as usize, out_channels as usize);
                }

                let timestamp_ms =
                    sent_samples * 1000 / (effective_rate as u64 * out_channels as u64).max(1);
                sent_samples += samples.len() as u64;

                let frame = AudioFrame {
                    samples,
                    sample_rate: effective_rate,
                    channels: out_channels,
                    timestamp_ms,
                };

                if frames_tx.try_send(frame).is_err() {
                    dropped.fetch_add(1, Ordering::SeqCst);
                }
            },
            |err| {
                error!("Input stream error: {}", err);
            },
            None,
        )
        .context("failed to build input stream")?;

    Ok(stream)
}

/// Convert interleaved stereo to mono by summing channels
/// (no division, to preserve volume)
fn stereo_to_mono(samples: &[i16]) -> Vec<i16> {
    let mut mono = Vec::with_capacity(samples.len() / 2);

    for pair in samples.chunks_exact(2) {
        let sum = pair[0] as i32 + pair[1] as i32;
        mono.push(sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    }

    mono
}

/// Decimate interleaved samples by keeping every Nth frame
fn decimate(samples: &[i16], ratio: usize, channels: usize) -> Vec<i16> {
    if ratio <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels.max(1))
        .step_by(ratio)
        .flatten()
        .copied()
        .collect()
}
