//! Segue Player - command-line entry point
//!
//! Plays a list of URLs (or local files) back-to-back through the default
//! output device, with crossfades and background preloading.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use segue_common::config::load_settings;
use segue_common::events::PlayerEvent;
use segue_common::{AudioQuality, Track};
use segue_player::audio::{AudioOutput, HttpLoader};
use segue_player::playback::ConnectionQuality;
use segue_player::PlaybackEngine;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for segue-player
#[derive(Parser, Debug)]
#[command(name = "segue-player")]
#[command(about = "Continuous playback with crossfades and preloading")]
#[command(version)]
struct Args {
    /// Settings file (overrides SEGUE_CONFIG and the user config file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Crossfade duration in seconds (0 disables)
    #[arg(short = 'x', long, env = "SEGUE_CROSSFADE")]
    crossfade: Option<f64>,

    /// Quality preference: auto, lossless, high, medium
    #[arg(short, long, env = "SEGUE_QUALITY")]
    quality: Option<AudioQuality>,

    /// Track URLs or file paths, played in order
    #[arg(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "segue_player=info,segue_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let (mut settings, source) =
        load_settings(args.config.as_deref()).context("Failed to load settings")?;
    info!("Settings source: {:?}", source);

    if let Some(crossfade) = args.crossfade {
        settings.crossfade = crossfade;
    }
    if let Some(quality) = args.quality {
        settings.audio_quality = quality;
    }

    let loader = HttpLoader::new(settings.load_timeout_duration())
        .context("Failed to build HTTP client")?;
    let engine = Arc::new(
        PlaybackEngine::new(
            settings,
            Arc::new(loader),
            Arc::new(ConnectionQuality::default()),
        )
        .context("Failed to initialize playback engine")?,
    );

    let mut output = AudioOutput::open_default().context("Failed to open audio output")?;
    let render = engine.render_handle();
    let channels = output.channels() as usize;
    let sample_rate = output.sample_rate();
    output
        .start(move |buf| render.render(buf, channels, sample_rate))
        .context("Failed to start audio output")?;

    let mut events = engine.subscribe();
    engine.start();

    let mut tracks = args.urls.iter().enumerate().map(|(i, url)| track_for_url(i, url));
    let first = tracks.next();
    for track in tracks {
        engine.add_to_queue(track).await;
    }
    if let Some(track) = first {
        // Failures are reported through the event stream below
        let _ = engine.play(track).await;
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
            event = events.recv() => match event {
                Ok(PlayerEvent::StateChange { track: Some(track), is_playing: true, .. }) => {
                    info!("Now playing: {}", track.title);
                }
                Ok(PlayerEvent::Error { error, .. }) => {
                    error!("{}", error);
                    if engine.queue_len().await == 0 && !engine.is_playing().await {
                        info!("Nothing left to play");
                        break;
                    }
                    let engine = Arc::clone(&engine);
                    tokio::spawn(async move {
                        let _ = engine.play_next().await;
                    });
                }
                Ok(PlayerEvent::TrackEnd { .. }) => {
                    info!("Queue finished");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!("Event stream lagged by {} events", n),
                Err(RecvError::Closed) => break,
            },
        }
    }

    let stats = engine.get_stats().await;
    info!("Session stats: {}", serde_json::to_string(&stats)?);

    engine.shutdown().await;
    let device_errors = output.error_count();
    if device_errors > 0 {
        warn!("Audio device reported {} stream error(s)", device_errors);
    }
    output.stop().context("Failed to stop audio output")?;
    info!("Shutdown complete");
    Ok(())
}

/// Build a single-URL track, titled after the last path segment
fn track_for_url(index: usize, url: &str) -> Track {
    let title = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(url)
        .to_string();
    Track::new(format!("track-{}", index + 1), title, "Unknown artist").with_audio_url(url)
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
