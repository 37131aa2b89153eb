//! # raw-audio-core
//!
//! Platform-agnostic raw-PCM capture/playback core.
//!
//! Two independent engines, each owning one device stream and at most one
//! background worker: the [`Recorder`] pulls 16-bit sample blocks from an
//! input stream, persists them to a flat headerless little-endian file and
//! reports each block to an observer; the [`Player`] streams such a file
//! back out in a single pass. A pure [`calculate_decibel`] function turns a
//! reported block into a displayable level. Platform backends
//! (`raw-audio-cpal`) implement the provider traits and plug into the
//! generic engines.
//!
//! ## Architecture
//!
//! ```text
//! raw-audio-core (this crate)
//! ├── traits/       ← InputProvider/InputStream, OutputProvider/OutputStream,
//! │                   BufferObserver, PlaybackObserver
//! ├── models/       ← StreamConfig, EngineError, RecorderState, PlayerState
//! ├── engine/       ← Recorder + RecorderBuilder, Player + PlayerBuilder
//! └── processing/   ← level meter, PCM flat-file codec, sample ring buffer
//! ```

pub mod engine;
pub mod models;
pub mod processing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use engine::player::{Player, PlayerBuilder};
pub use engine::recorder::{Recorder, RecorderBuilder};
pub use models::config::{
    CaptureSource, ChannelLayout, DeviceRole, PlaybackUsage, SampleEncoding, StreamConfig,
};
pub use models::error::EngineError;
pub use models::state::{PlayerState, RecorderState};
pub use processing::level_meter::calculate_decibel;
pub use processing::pcm;
pub use processing::ring_buffer::RingBuffer;
pub use traits::observer::{BufferObserver, PlaybackObserver};
pub use traits::provider::{InputProvider, InputStream, OutputProvider, OutputStream};
