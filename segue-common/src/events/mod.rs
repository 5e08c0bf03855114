//! Event types for the segue event system
//!
//! Provides the closed set of player notifications and the EventBus that
//! distributes them to subscribers (typically the UI layer).

mod playback_types;
mod shared_types;

pub use playback_types::{ErrorKind, TransportPhase};
pub use shared_types::PlayerStats;

use crate::Track;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Player event types
///
/// One payload per variant; events serialize with a `type` tag so a UI
/// bridge can forward them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlayerEvent {
    /// Current track or playing flag changed
    ///
    /// Emitted after every successful play, on pause/resume, and when
    /// playback stops at the end of the queue.
    StateChange {
        track: Option<Track>,
        is_playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress tick, emitted once per progress-loop iteration
    Progress {
        /// Normalized position (0.0 - 1.0)
        progress: f64,
        /// Seconds since track start
        current_time: f64,
        /// Track duration in seconds
        duration: f64,
        /// Whether a foreground load is in flight
        buffering: bool,
    },

    /// Foreground load started (cache miss)
    BufferStart { track: Track },

    /// Foreground load finished, successfully or not
    BufferEnd { track: Track },

    /// A surfaced failure; playback did not advance
    Error {
        error: String,
        kind: ErrorKind,
        track: Option<Track>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback of a track ended without a successor
    TrackEnd {
        track: Track,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents changed
    QueueUpdate { queue: Vec<Track> },

    /// Background prefetch stored a track in the preload cache
    PreloadComplete { track: Track },
}

impl PlayerEvent {
    /// Event type name as serialized in the `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::StateChange { .. } => "stateChange",
            PlayerEvent::Progress { .. } => "progress",
            PlayerEvent::BufferStart { .. } => "bufferStart",
            PlayerEvent::BufferEnd { .. } => "bufferEnd",
            PlayerEvent::Error { .. } => "error",
            PlayerEvent::TrackEnd { .. } => "trackEnd",
            PlayerEvent::QueueUpdate { .. } => "queueUpdate",
            PlayerEvent::PreloadComplete { .. } => "preloadComplete",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use segue_common::events::{EventBus, PlayerEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(PlayerEvent::QueueUpdate { queue: Vec::new() });
///
/// match rx.try_recv() {
///     Ok(PlayerEvent::QueueUpdate { queue }) => assert!(queue.is_empty()),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before the slowest
    ///   subscriber starts losing the oldest ones. Progress events arrive at
    ///   display-refresh rate, so UI subscribers want a few hundred at least.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
