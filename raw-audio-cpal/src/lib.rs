//! # raw-audio-cpal
//!
//! cpal device backend for `raw-audio-core`.
//!
//! Provides:
//! - `CpalBackend` — implements `InputProvider` and `OutputProvider` over
//!   the default cpal host
//! - `CpalInputStream` — blocking-read capture stream fed by the device
//!   callback through a ring buffer
//! - `CpalOutputStream` — blocking-write playback stream drained by the
//!   device callback
//!
//! ## Usage
//! ```ignore
//! use raw_audio_core::{PlayerBuilder, RecorderBuilder};
//! use raw_audio_cpal::CpalBackend;
//!
//! let backend = CpalBackend::new();
//!
//! let mut recorder = RecorderBuilder::new()
//!     .output_path("/tmp/take.pcm")
//!     .build(&backend)?;
//! recorder.start_recording();
//! // ...
//! recorder.stop_recording();
//! recorder.release();
//!
//! let mut player = PlayerBuilder::new("/tmp/take.pcm").build(&backend)?;
//! player.play();
//! ```

pub mod backend;
pub mod input;
pub mod output;

pub use backend::CpalBackend;
pub use input::CpalInputStream;
pub use output::CpalOutputStream;
