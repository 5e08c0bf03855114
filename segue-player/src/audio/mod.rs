//! Audio subsystem
//!
//! Loading (fetch + decode), in-memory buffers, and device output.

pub mod decoder;
pub mod loader;
pub mod output;
pub mod types;

pub use decoder::SimpleDecoder;
pub use loader::{AudioLoader, HttpLoader};
pub use output::AudioOutput;
pub use types::DecodedBuffer;
