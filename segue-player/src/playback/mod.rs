//! Playback engine, decks, and queue management

pub mod cache;
pub mod crossfade;
pub mod deck;
pub mod deck_pair;
pub mod engine;
pub mod preload;
pub mod quality;
pub mod queue;
pub mod state;

pub use cache::PreloadCache;
pub use deck::{DeckId, DeckStatus};
pub use deck_pair::{DeckPair, RenderHandle};
pub use engine::{PlaybackEngine, TickOutcome};
pub use preload::PreloadStep;
pub use quality::{ConnectionProbe, ConnectionQuality};
pub use queue::PlaybackQueue;
pub use state::PlaybackState;
