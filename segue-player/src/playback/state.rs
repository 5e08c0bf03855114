//! Playback state
//!
//! Mutated only by transport operations; read by the progress loop.

use segue_common::events::TransportPhase;
use segue_common::Track;
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub phase: TransportPhase,
    /// Position held while paused or idle
    pub paused_position: f64,
    /// Duration of the current track in seconds
    pub duration: f64,
    /// A foreground load is in flight
    pub buffering: bool,
    /// Auto-advance already fired for the current track
    pub advance_fired: bool,
    /// A graceful stop is fading the active deck out
    pub stopping: bool,
    listen_started: Option<Instant>,
    total_listen: f64,
    pub total_plays: u64,
}

impl PlaybackState {
    /// Begin counting listen time, if not already counting
    pub fn start_listening(&mut self, now: Instant) {
        if self.listen_started.is_none() {
            self.listen_started = Some(now);
        }
    }

    pub fn stop_listening(&mut self, now: Instant) {
        if let Some(started) = self.listen_started.take() {
            self.total_listen += now.saturating_duration_since(started).as_secs_f64();
        }
    }

    /// Accumulated audible playback time in seconds
    pub fn listen_time(&self, now: Instant) -> f64 {
        let running = self
            .listen_started
            .map(|s| now.saturating_duration_since(s).as_secs_f64())
            .unwrap_or(0.0);
        self.total_listen + running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_listen_time_excludes_pauses() {
        let t0 = Instant::now();
        let mut state = PlaybackState::default();

        state.start_listening(t0);
        state.stop_listening(t0 + Duration::from_secs(10));
        state.start_listening(t0 + Duration::from_secs(30));

        let total = state.listen_time(t0 + Duration::from_secs(35));
        assert!((total - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_start_keeps_first_origin() {
        let t0 = Instant::now();
        let mut state = PlaybackState::default();
        state.start_listening(t0);
        state.start_listening(t0 + Duration::from_secs(5));
        assert!((state.listen_time(t0 + Duration::from_secs(8)) - 8.0).abs() < 1e-9);
    }
}
