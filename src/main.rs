use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quickscribe::capture::{display, uploader};
use quickscribe::{AppState, AudioFile, CaptureController, Clip, Config, HostedWhisper, ViewState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "quickscribe",
    version,
    about = "Record audio, relay it to a hosted speech-to-text model, and print the transcript"
)]
struct Cli {
    /// Config file to load (extension optional)
    #[arg(long, default_value = "config/quickscribe")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the transcription relay service
    Serve,
    /// Record from the microphone and print transcripts interactively
    Record,
    /// Upload an existing WAV file through the relay
    Send {
        /// WAV file to transcribe
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Record => record(config).await,
        Command::Send { path } => send(config, path).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Quickscribe v0.1.0");
    info!("Loaded config: {}", config.service.name);

    let transcriber = Arc::new(HostedWhisper::new(&config.upstream));
    let app = quickscribe::create_router(AppState::new(transcriber));

    let addr = format!("{}:{}", config.service.http.bind, config.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Relay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn record(config: Config) -> Result<()> {
    let controller = CaptureController::new(config.capture);
    let view = controller.view();

    if let Err(e) = controller.acquire_devices().await {
        // No retry and no recovery prompt; recording requests become no-ops
        error!("Error accessing input device: {:#}", e);
    }

    println!("Press Enter to start/stop recording, Ctrl-D to quit.");
    println!("{}", display::transcript_line(&view));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while lines.next_line().await?.is_some() {
        if view.is_processing() {
            println!("{}", display::transcript_line(&view));
            continue;
        }

        if view.is_recording() {
            controller.stop_recording().await;
            println!("{}", display::transcript_line(&view));

            while view.is_processing() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }

            println!("{}", display::transcript_line(&view));
        } else {
            controller.start_recording().await;
            if view.is_recording() {
                println!(
                    "Recording... press Enter to stop (input level {:.2})",
                    view.level()
                );
            }
        }
    }

    controller.release_devices().await?;

    let stats = controller.stats().await;
    info!("Session complete: {} clip(s) recorded", stats.clips_recorded);

    Ok(())
}

async fn send(config: Config, path: PathBuf) -> Result<()> {
    let audio = AudioFile::open(&path)?;
    let clip = Clip::from_samples(audio.samples, audio.sample_rate, audio.channels)?;

    info!(
        "Sending {:.1}s clip to {}",
        clip.duration_secs, config.capture.relay_url
    );

    let view = ViewState::new();
    let http = reqwest::Client::new();
    uploader::send_clip(&http, &config.capture, clip, &view).await;

    println!("{}", display::transcript_line(&view));

    Ok(())
}
