//! Transport operations module
//!
//! **Responsibilities:**
//! - Pause/resume, seek, skip, replay
//! - Advancing to the next queued track, with a graceful stop when the queue
//!   is empty
//! - Live volume and settings changes
//!
//! A transport command that arrives during a crossfade first snaps the fade
//! to completion, then applies to the new active deck. Every command also
//! cancels a pending graceful stop.

use super::core::{PlaybackEngine, STOP_FADE};
use crate::error::{Error, Result};
use crate::playback::deck_pair::DeckPair;
use crate::playback::state::PlaybackState;
use segue_common::events::{PlayerEvent, TransportPhase};
use segue_common::{PlayerSettings, Track};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

impl PlaybackEngine {
    /// Pause if playing, resume if paused
    ///
    /// Pausing captures the elapsed position; resuming restarts the active
    /// deck there. From `Idle` with a loaded deck (after the queue ran dry)
    /// playback restarts from the held position.
    pub async fn toggle_play(&self) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.write().await;

        let is_playing = {
            let mut decks = self.lock_decks();
            self.cancel_pending_transition(&mut state, &mut decks, now);

            match state.phase {
                TransportPhase::Playing | TransportPhase::Crossfading => {
                    let deck = decks.active_deck_mut();
                    deck.stop(now);
                    state.paused_position = deck.position(now);
                    state.phase = TransportPhase::Paused;
                    state.stop_listening(now);
                    info!("Paused at {:.2}s", state.paused_position);
                    false
                }
                TransportPhase::Paused | TransportPhase::Idle if decks.active_deck().is_loaded() => {
                    let deck = decks.active_deck_mut();
                    deck.set_volume(1.0, now);
                    deck.start(state.paused_position, now);
                    if state.phase == TransportPhase::Idle {
                        state.advance_fired = false;
                    }
                    state.phase = TransportPhase::Playing;
                    state.start_listening(now);
                    info!("Resumed at {:.2}s", state.paused_position);
                    true
                }
                phase => {
                    return Err(Error::InvalidState(format!(
                        "nothing to resume (phase {})",
                        phase
                    )));
                }
            }
        };

        let track = state.current_track.clone();
        drop(state);

        self.events.emit_lossy(PlayerEvent::StateChange {
            track,
            is_playing,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Move to `seconds`, clamped to `[0, duration]`
    ///
    /// While playing the active deck restarts at the new offset; while paused
    /// only the held position changes.
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.write().await;

        let target = if seconds.is_finite() { seconds } else { 0.0 };
        let target = target.clamp(0.0, state.duration.max(0.0));

        let mut decks = self.lock_decks();
        self.cancel_pending_transition(&mut state, &mut decks, now);

        match state.phase {
            TransportPhase::Playing | TransportPhase::Crossfading => {
                let deck = decks.active_deck_mut();
                deck.stop(now);
                deck.start(target, now);
            }
            TransportPhase::Paused | TransportPhase::Idle if decks.active_deck().is_loaded() => {
                state.paused_position = target;
            }
            phase => {
                return Err(Error::InvalidState(format!("cannot seek while {}", phase)));
            }
        }
        drop(decks);

        state.advance_fired = false;
        debug!("Seeked to {:.2}s", target);
        Ok(())
    }

    pub async fn skip_forward(&self, seconds: f64) -> Result<()> {
        let position = self.position().await;
        self.seek(position + seconds).await
    }

    pub async fn skip_backward(&self, seconds: f64) -> Result<()> {
        let position = self.position().await;
        self.seek(position - seconds).await
    }

    /// Restart the current track from the beginning and make sure it plays
    pub async fn replay(&self) -> Result<()> {
        self.seek(0.0).await?;
        let phase = self.state.read().await.phase;
        if !phase.is_audible() {
            self.toggle_play().await?;
        }
        Ok(())
    }

    /// Play the queue head, or stop gracefully if the queue is empty
    pub async fn play_next(self: &Arc<Self>) -> Result<()> {
        let next = self.queue.write().await.pop_front();
        match next {
            Some(track) => {
                self.emit_queue_update().await;
                self.play(track).await
            }
            None => {
                info!("Queue empty, stopping");
                self.graceful_stop().await;
                Ok(())
            }
        }
    }

    /// Fade the active deck out, then stop and report the track as ended
    ///
    /// From `Paused` the deck is already silent, so the stop is immediate.
    pub(super) async fn graceful_stop(&self) {
        let now = Instant::now();
        let transition = {
            let mut state = self.state.write().await;
            let phase = state.phase;
            match phase {
                TransportPhase::Playing | TransportPhase::Crossfading => {}
                TransportPhase::Paused => {
                    self.transition_generation.fetch_add(1, Ordering::SeqCst);
                    state.phase = TransportPhase::Idle;
                    state.stopping = false;
                    state.stop_listening(now);
                    let track = state.current_track.clone();
                    drop(state);
                    info!("Stopped from pause");
                    self.emit_stopped(track);
                    return;
                }
                _ => return,
            }
            {
                let mut decks = self.lock_decks();
                decks.finish_crossfade(now);
                decks.active_deck_mut().ramp_volume(0.0, STOP_FADE, now);
            }
            state.stopping = true;
            state.phase = TransportPhase::Playing;
            self.transition_generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tokio::time::sleep(STOP_FADE).await;

        let now = Instant::now();
        let mut state = self.state.write().await;
        if self.transition_generation.load(Ordering::SeqCst) != transition {
            debug!("Graceful stop superseded");
            return;
        }
        {
            let mut decks = self.lock_decks();
            let deck = decks.active_deck_mut();
            deck.stop(now);
            state.paused_position = deck.position(now);
        }
        state.phase = TransportPhase::Idle;
        state.stopping = false;
        state.stop_listening(now);
        let track = state.current_track.clone();
        drop(state);

        self.emit_stopped(track);
    }

    /// End the current track after its auto-advance found nothing playable
    ///
    /// Does nothing if another track took over or the track was seeked,
    /// toggled or replayed since the advance fired.
    pub(super) async fn stop_after_failed_advance(&self, ended_track_id: &str) {
        {
            let state = self.state.read().await;
            let still_current = state
                .current_track
                .as_ref()
                .is_some_and(|t| t.id == ended_track_id);
            if !still_current || !state.advance_fired {
                return;
            }
        }
        warn!("No playable successor for {}, stopping", ended_track_id);
        self.graceful_stop().await;
    }

    fn emit_stopped(&self, track: Option<Track>) {
        if let Some(ended) = track.clone() {
            self.events.emit_lossy(PlayerEvent::TrackEnd {
                track: ended,
                timestamp: chrono::Utc::now(),
            });
        }
        self.events.emit_lossy(PlayerEvent::StateChange {
            track,
            is_playing: false,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Set master volume (clamped to `[0, 1]`)
    pub async fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.settings.write().await.volume = volume;
        self.lock_decks().set_master_volume(volume);
        debug!("Volume set to {:.2}", volume);
    }

    /// Replace the live settings
    ///
    /// A smaller cache bound evicts immediately; a changed look-ahead re-runs
    /// the preload trigger. Turning the auto fade-out off restores the level
    /// it may already have lowered.
    pub async fn update_settings(&self, settings: PlayerSettings) -> Result<()> {
        let settings = settings.validate()?;

        let previous = {
            let mut current = self.settings.write().await;
            std::mem::replace(&mut *current, settings.clone())
        };
        info!("Settings updated");

        {
            let mut decks = self.lock_decks();
            decks.set_master_volume(settings.volume);
            decks.set_normalize(settings.normalize_volume);
        }

        if previous.auto_fade_out && !settings.auto_fade_out {
            let state = self.state.read().await;
            if state.phase == TransportPhase::Playing && !state.stopping {
                self.lock_decks().active_deck_mut().set_volume(1.0, Instant::now());
                debug!("Auto fade-out disabled, deck level restored");
            }
        }

        if settings.max_cache_size != previous.max_cache_size {
            let evicted = self.cache.write().await.set_capacity(settings.max_cache_size);
            if !evicted.is_empty() {
                debug!("Cache shrunk to {}: evicted {:?}", settings.max_cache_size, evicted);
            }
        }

        if settings.preload_ahead != previous.preload_ahead {
            self.trigger_preload().await;
        }
        Ok(())
    }

    /// Snap a running crossfade, cancel a pending graceful stop, and
    /// invalidate any scheduled transition work
    pub(super) fn cancel_pending_transition(
        &self,
        state: &mut PlaybackState,
        decks: &mut DeckPair,
        now: Instant,
    ) {
        if decks.finish_crossfade(now).is_some() {
            debug!("Crossfade snapped by transport command");
        }
        if state.phase == TransportPhase::Crossfading {
            state.phase = TransportPhase::Playing;
        }
        if state.stopping {
            state.stopping = false;
            decks.active_deck_mut().set_volume(1.0, now);
            debug!("Graceful stop cancelled by transport command");
        }
        self.transition_generation.fetch_add(1, Ordering::SeqCst);
    }
}
