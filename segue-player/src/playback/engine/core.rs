//! Core playback engine - lifecycle and track start
//!
//! **Responsibilities:**
//! - PlaybackEngine struct definition and construction
//! - Lifecycle control (start, shutdown)
//! - `play`: URL resolution, cache lookup, load with retry, deck assignment,
//!   and the hard-cut/crossfade decision
//!
//! Locks are always taken in the order settings → state → queue → cache →
//! prefetch → decks, and none is held across a load.

use crate::audio::loader::AudioLoader;
use crate::audio::types::DecodedBuffer;
use crate::error::{Error, LoadError, Result};
use crate::playback::cache::PreloadCache;
use crate::playback::deck_pair::{lock_decks, DeckPair};
use crate::playback::preload::PrefetchQueue;
use crate::playback::quality::{self, ConnectionProbe};
use crate::playback::queue::PlaybackQueue;
use crate::playback::state::PlaybackState;
use segue_common::events::{EventBus, PlayerEvent, TransportPhase};
use segue_common::{PlayerSettings, Track};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Auto-advance fires this far before the end of a track (gapless mode)
pub const GAPLESS_EPSILON: f64 = 0.1;

/// Extra time after a crossfade before the outgoing deck is stopped
pub const CROSSFADE_SETTLE: Duration = Duration::from_millis(100);

/// Wait before retrying a network-class load failure
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Total attempts for one `play` call
pub(super) const MAX_PLAY_ATTEMPTS: u32 = 2;

/// Volume ramp used when the queue runs dry
pub const STOP_FADE: Duration = Duration::from_millis(500);

/// Progress loop cadence (about one display refresh)
pub const PROGRESS_TICK: Duration = Duration::from_millis(16);

/// Preload scheduler delay between iterations
pub const PRELOAD_IDLE_DELAY: Duration = Duration::from_millis(100);

/// Auto fade-out never lowers the active deck below this level
pub const AUTO_FADE_FLOOR: f32 = 0.5;

const EVENT_BUS_CAPACITY: usize = 1024;

/// How a `play` attempt ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PlayOutcome {
    Started,
    /// A newer `play` call took over while this one was loading
    Superseded,
}

/// Playback engine - owns the decks, cache, queue and background loops
///
/// Construct one per player and share it by `Arc`. Everything internal is
/// private; collaborators use the method surface and the event bus.
pub struct PlaybackEngine {
    pub(super) settings: RwLock<PlayerSettings>,

    pub(super) state: RwLock<PlaybackState>,

    pub(super) queue: RwLock<PlaybackQueue>,

    pub(super) cache: RwLock<PreloadCache>,

    pub(super) prefetch: RwLock<PrefetchQueue>,

    /// Shared with the audio output callback
    pub(super) decks: Arc<Mutex<DeckPair>>,

    pub(super) loader: Arc<dyn AudioLoader>,

    pub(super) connection: Arc<dyn ConnectionProbe>,

    pub(super) events: EventBus,

    /// Bumped by every `play` call; a load whose generation is no longer
    /// current is stale
    pub(super) load_generation: AtomicU64,

    /// Bumped by every deck transition and transport command; scheduled
    /// crossfade completions and graceful stops check it before acting
    pub(super) transition_generation: AtomicU64,

    /// Background loops keep running while set
    pub(super) running: AtomicBool,

    pub(super) tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PlaybackEngine {
    /// Create a new engine
    ///
    /// Settings are validated here; the engine is idle until `play` and has
    /// no background loops until `start`.
    pub fn new(
        settings: PlayerSettings,
        loader: Arc<dyn AudioLoader>,
        connection: Arc<dyn ConnectionProbe>,
    ) -> Result<Self> {
        let settings = settings.validate()?;
        info!(
            "Creating playback engine: crossfade={}s, quality={:?}, cache={}, preload_ahead={}",
            settings.crossfade, settings.audio_quality, settings.max_cache_size, settings.preload_ahead
        );

        let mut decks = DeckPair::new(Instant::now());
        decks.set_master_volume(settings.volume);
        decks.set_normalize(settings.normalize_volume);

        Ok(Self {
            cache: RwLock::new(PreloadCache::new(settings.max_cache_size)),
            settings: RwLock::new(settings),
            state: RwLock::new(PlaybackState::default()),
            queue: RwLock::new(PlaybackQueue::new()),
            prefetch: RwLock::new(PrefetchQueue::new()),
            decks: Arc::new(Mutex::new(decks)),
            loader,
            connection,
            events: EventBus::new(EVENT_BUS_CAPACITY),
            load_generation: AtomicU64::new(0),
            transition_generation: AtomicU64::new(0),
            running: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the progress loop and the preload scheduler
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Playback engine already started");
            return;
        }
        info!("Starting playback engine loops");

        let progress = self.spawn_progress_loop();
        let preload = self.spawn_preload_loop();
        self.lock_tasks().extend([progress, preload]);
    }

    /// Stop the background loops and free every buffer
    pub async fn shutdown(&self) {
        info!("Shutting down playback engine");
        self.running.store(false, Ordering::SeqCst);
        for task in self.lock_tasks().drain(..) {
            task.abort();
        }

        self.load_generation.fetch_add(1, Ordering::SeqCst);
        self.transition_generation.fetch_add(1, Ordering::SeqCst);

        let now = Instant::now();
        {
            let mut state = self.state.write().await;
            state.stop_listening(now);
            state.phase = TransportPhase::Idle;
            state.buffering = false;
            state.stopping = false;
        }
        self.cache.write().await.clear();
        self.prefetch.write().await.clear();
        self.lock_decks().release(now);
    }

    /// Play a track now
    ///
    /// Resolves a URL, takes the buffer from the preload cache or loads it,
    /// then crossfades into it if something is already playing (and the
    /// crossfade setting is non-zero) or hard-cuts otherwise.
    ///
    /// A network-class failure is retried once after [`RETRY_DELAY`]. Any
    /// surfaced failure emits `PlayerEvent::Error` and leaves whatever was
    /// playing untouched.
    pub async fn play(self: &Arc<Self>, track: Track) -> Result<()> {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Play requested: {} - {} ({})", track.artist, track.title, track.id);

        let mut attempt = 1;
        loop {
            match self.try_play(&track, generation).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < MAX_PLAY_ATTEMPTS => {
                    warn!("Load of {} failed ({}), retrying in {:?}", track.id, e, RETRY_DELAY);
                    tokio::time::sleep(RETRY_DELAY).await;
                    if !self.is_current_load(generation) {
                        debug!("Retry of {} abandoned: superseded", track.id);
                        return Ok(());
                    }
                    attempt += 1;
                }
                Err(e) => {
                    self.report_failure(&track, &e, generation).await;
                    return Err(e);
                }
            }
        }
    }

    async fn try_play(self: &Arc<Self>, track: &Track, generation: u64) -> Result<PlayOutcome> {
        let (preference, timeout) = {
            let settings = self.settings.read().await;
            (settings.audio_quality, settings.load_timeout_duration())
        };

        let url = quality::select_url(track, preference, self.connection.is_good_connection())
            .ok_or_else(|| Error::NoAudioUrlAvailable {
                track_id: track.id.clone(),
            })?;

        let cached = self.cache.read().await.get(&track.id);
        let buffer = match cached {
            Some(buffer) => {
                debug!("Cache hit for {}", track.id);
                buffer
            }
            None => {
                {
                    let mut state = self.state.write().await;
                    state.buffering = true;
                    if matches!(state.phase, TransportPhase::Idle | TransportPhase::Error) {
                        state.phase = TransportPhase::Loading;
                    }
                }
                self.events.emit_lossy(PlayerEvent::BufferStart { track: track.clone() });

                debug!("Loading {} from {}", track.id, url);
                let result = self.load_with_timeout(&url, timeout).await;

                self.events.emit_lossy(PlayerEvent::BufferEnd { track: track.clone() });
                result?
            }
        };

        if !self.is_current_load(generation) {
            debug!("Discarding stale load of {}", track.id);
            self.cache_insert(&track.id, buffer).await;
            return Ok(PlayOutcome::Superseded);
        }

        self.start_track(track.clone(), buffer, generation).await;
        Ok(PlayOutcome::Started)
    }

    /// Put a loaded buffer on the decks and make it the current track
    async fn start_track(self: &Arc<Self>, track: Track, buffer: Arc<DecodedBuffer>, generation: u64) {
        let (crossfade, curve) = {
            let settings = self.settings.read().await;
            (settings.crossfade_duration(), settings.crossfade_curve)
        };

        let mut state = self.state.write().await;
        // A newer play may have taken over while we waited for the lock
        if !self.is_current_load(generation) {
            return;
        }

        let now = Instant::now();
        let was_audible = state.phase.is_audible() && !state.stopping;
        let duration = match buffer.duration_secs() {
            d if d > 0.0 => d,
            _ => track.duration.unwrap_or(0.0),
        };

        let crossfading = {
            let mut decks = self.lock_decks();
            decks.finish_crossfade(now);
            decks.load_standby(&track.id, buffer, now);
            if was_audible && !crossfade.is_zero() {
                decks.begin_crossfade(crossfade, curve, now);
                true
            } else {
                decks.hard_cut(now);
                false
            }
        };
        let transition = self.transition_generation.fetch_add(1, Ordering::SeqCst) + 1;

        state.current_track = Some(track.clone());
        state.phase = if crossfading {
            TransportPhase::Crossfading
        } else {
            TransportPhase::Playing
        };
        state.paused_position = 0.0;
        state.duration = duration;
        state.buffering = false;
        state.advance_fired = false;
        state.stopping = false;
        state.start_listening(now);
        state.total_plays += 1;
        drop(state);

        info!(
            "Now playing {} ({:.1}s, {})",
            track.id,
            duration,
            if crossfading { "crossfade" } else { "hard cut" }
        );

        if crossfading {
            let engine = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(crossfade + CROSSFADE_SETTLE).await;
                engine.complete_crossfade(transition).await;
            });
        }

        self.events.emit_lossy(PlayerEvent::StateChange {
            track: Some(track),
            is_playing: true,
            timestamp: chrono::Utc::now(),
        });

        self.trigger_preload().await;
    }

    /// Retire the outgoing deck once its fade has run out
    pub(super) async fn complete_crossfade(&self, transition: u64) {
        let mut state = self.state.write().await;
        if self.transition_generation.load(Ordering::SeqCst) != transition {
            return;
        }
        let retired = self.lock_decks().finish_crossfade(Instant::now());
        if state.phase == TransportPhase::Crossfading {
            state.phase = TransportPhase::Playing;
        }
        if let Some(deck) = retired {
            debug!("Crossfade complete, deck {} on standby", deck);
        }
    }

    async fn report_failure(&self, track: &Track, err: &Error, generation: u64) {
        error!("Failed to play {}: {}", track.id, err);

        if self.is_current_load(generation) {
            let mut state = self.state.write().await;
            state.buffering = false;
            if state.phase == TransportPhase::Loading {
                state.phase = TransportPhase::Error;
            }
        }

        if let Some(kind) = err.event_kind() {
            self.events.emit_lossy(PlayerEvent::Error {
                error: err.to_string(),
                kind,
                track: Some(track.clone()),
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Load through the loader, bounded by the configured timeout
    pub(super) async fn load_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<Arc<DecodedBuffer>, LoadError> {
        match tokio::time::timeout(timeout, self.loader.load(url)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::network(format!(
                "load of {} timed out after {:?}",
                url, timeout
            ))),
        }
    }

    /// Insert into the preload cache, keeping the prefetch queue free of
    /// cached ids
    pub(super) async fn cache_insert(&self, track_id: &str, buffer: Arc<DecodedBuffer>) {
        let evicted = self.cache.write().await.put(track_id, buffer);
        if let Some(old) = evicted {
            debug!("Cache full: evicted {} for {}", old, track_id);
        }
        self.prefetch.write().await.remove(track_id);
    }

    pub(super) fn is_current_load(&self, generation: u64) -> bool {
        self.load_generation.load(Ordering::SeqCst) == generation
    }

    pub(super) fn lock_decks(&self) -> MutexGuard<'_, DeckPair> {
        lock_decks(&self.decks)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
