//! Progress loop and auto-advance
//!
//! One tick computes the active deck's position, decides whether the track
//! has reached its advance point, applies the optional auto fade-out, and
//! emits a progress event.

use super::core::{PlaybackEngine, AUTO_FADE_FLOOR, GAPLESS_EPSILON, PROGRESS_TICK};
use segue_common::events::{PlayerEvent, TransportPhase};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// What a progress tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to report (no track, or the track already handed off)
    Idle,
    /// Progress event emitted
    Progress,
    /// Progress emitted and `play_next` scheduled
    AutoAdvance,
}

/// Volume factor for the auto fade-out window
///
/// Linear from 1.0 at `duration - start_offset` down to the floor at
/// `duration - crossfade`, held at the floor after that.
pub(super) fn auto_fade_level(position: f64, duration: f64, start_offset: f64, crossfade: f64) -> f32 {
    let window_start = duration - start_offset;
    let window_end = duration - crossfade;
    if window_end <= window_start || position < window_start {
        return 1.0;
    }
    if position >= window_end {
        return AUTO_FADE_FLOOR;
    }
    let t = ((position - window_start) / (window_end - window_start)) as f32;
    1.0 - (1.0 - AUTO_FADE_FLOOR) * t
}

impl PlaybackEngine {
    /// Run one progress iteration
    ///
    /// Auto-advance fires exactly once per track: at `duration - 0.1s` with
    /// gapless playback, at `duration` without. Once fired, further ticks for
    /// that track report nothing. If the advance fails, the finished track
    /// is stopped as if the queue had run dry.
    pub async fn tick(self: &Arc<Self>) -> TickOutcome {
        let (gapless, auto_fade, fade_offset, crossfade) = {
            let settings = self.settings.read().await;
            (
                settings.gapless_playback,
                settings.auto_fade_out,
                settings.fade_out_start_offset,
                settings.crossfade,
            )
        };

        let now = Instant::now();
        let mut state = self.state.write().await;
        if state.current_track.is_none() || state.advance_fired {
            return TickOutcome::Idle;
        }

        let audible = state.phase.is_audible();
        let position = if audible {
            self.lock_decks().active_deck().position(now)
        } else {
            state.paused_position
        };
        let duration = state.duration;

        let mut outcome = TickOutcome::Progress;
        if audible && !state.stopping && duration > 0.0 {
            let advance_at = if gapless { duration - GAPLESS_EPSILON } else { duration };
            if position >= advance_at {
                state.advance_fired = true;
                outcome = TickOutcome::AutoAdvance;
            }
        }

        if auto_fade && outcome == TickOutcome::Progress && state.phase == TransportPhase::Playing && !state.stopping {
            let level = auto_fade_level(position, duration, fade_offset, crossfade);
            self.lock_decks().active_deck_mut().set_volume(level, now);
        }

        let buffering = state.buffering;
        let track_id = state.current_track.as_ref().map(|t| t.id.clone());
        drop(state);

        let progress = if duration > 0.0 {
            (position / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.events.emit_lossy(PlayerEvent::Progress {
            progress,
            current_time: position,
            duration,
            buffering,
        });

        if outcome == TickOutcome::AutoAdvance {
            debug!("Auto-advance at {:.2}s of {:.2}s", position, duration);
            let engine = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = engine.play_next().await {
                    warn!("Auto-advance failed: {}", e);
                    // The finished track has nothing left to play
                    if let Some(id) = track_id {
                        engine.stop_after_failed_advance(&id).await;
                    }
                }
            });
        }

        outcome
    }

    pub(super) fn spawn_progress_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Progress loop started");
            let mut ticker = tokio::time::interval(PROGRESS_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            while engine.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                engine.tick().await;
            }
            debug!("Progress loop stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_fade_window() {
        // 180s track, fade from 170s down to the floor at 177s
        assert_eq!(auto_fade_level(100.0, 180.0, 10.0, 3.0), 1.0);
        assert_eq!(auto_fade_level(170.0, 180.0, 10.0, 3.0), 1.0);
        let mid = auto_fade_level(173.5, 180.0, 10.0, 3.0);
        assert!((mid - 0.75).abs() < 1e-6);
        assert_eq!(auto_fade_level(178.0, 180.0, 10.0, 3.0), AUTO_FADE_FLOOR);
    }

    #[test]
    fn test_auto_fade_empty_window() {
        // Crossfade longer than the fade-out offset leaves no window
        assert_eq!(auto_fade_level(179.0, 180.0, 2.0, 5.0), 1.0);
    }
}
