//! Test helper modules for segue-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - MockLoader: scripted in-memory AudioLoader (results, failures, latency)
//! - Track and engine builders
//! - Event collection

#![allow(dead_code)]

pub mod mock_loader;

pub use mock_loader::MockLoader;

use segue_common::events::PlayerEvent;
use segue_common::{PlayerSettings, Track};
use segue_player::playback::{ConnectionQuality, PlaybackEngine};
use std::sync::Arc;
use tokio::sync::broadcast;

/// URL the helpers assign to a track id
pub fn url_for(id: &str) -> String {
    format!("https://cdn.test/{}.mp3", id)
}

/// Single-URL track with a predictable URL
pub fn track(id: &str) -> Track {
    Track::new(id, format!("Title {}", id), "Test Artist").with_audio_url(url_for(id))
}

/// Engine over a mock loader with a good connection
pub fn engine_with(settings: PlayerSettings, loader: Arc<MockLoader>) -> Arc<PlaybackEngine> {
    Arc::new(
        PlaybackEngine::new(settings, loader, Arc::new(ConnectionQuality::default()))
            .expect("valid settings"),
    )
}

/// Everything currently buffered on a receiver
pub fn drain_events(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let spawned tasks run until they block
///
/// Under a paused clock this advances time by one millisecond, which only
/// happens once every other task is idle.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
}
