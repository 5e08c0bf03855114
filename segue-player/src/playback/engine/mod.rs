//! Playback engine module
//!
//! **Module Structure:**
//! - `core.rs`: Struct, lifecycle, and `play`
//! - `transport.rs`: Pause/resume, seek, skip, replay, play-next, settings
//! - `queue.rs`: Queue operations
//! - `preload.rs`: Preload trigger and background scheduler
//! - `progress.rs`: Progress loop and auto-advance
//! - `diagnostics.rs`: Stats and status accessors

mod core;
mod diagnostics;
mod preload;
mod progress;
mod queue;
mod transport;

pub use core::{
    PlaybackEngine, AUTO_FADE_FLOOR, CROSSFADE_SETTLE, GAPLESS_EPSILON, PRELOAD_IDLE_DELAY,
    PROGRESS_TICK, RETRY_DELAY, STOP_FADE,
};
pub use progress::TickOutcome;
