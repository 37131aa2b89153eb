use crate::models::config::StreamConfig;
use crate::models::error::EngineError;

/// Factory for device-backed input streams.
///
/// Implemented by platform backends (`raw-audio-cpal`) and by mock providers
/// in tests. The two methods split exactly along the engine's two
/// construction failures: a rejected buffer-size query is a
/// `Configuration` error, a stream that cannot reach a ready state is an
/// `Initialization` error.
pub trait InputProvider {
    type Stream: InputStream;

    /// Minimum capture buffer size, in frames, for `config`.
    ///
    /// Fails with [`EngineError::Configuration`] when the device rejects the
    /// combination or no capture device exists.
    fn min_buffer_frames(&self, config: &StreamConfig) -> Result<usize, EngineError>;

    /// Open an input stream for `config`.
    ///
    /// Fails with [`EngineError::Initialization`] when the stream does not
    /// reach a ready state.
    fn open_input(&self, config: &StreamConfig) -> Result<Self::Stream, EngineError>;
}

/// A device-backed capture stream.
///
/// Shared between the engine's control surface and its capture worker, so
/// all methods take `&self`; implementations use interior state.
pub trait InputStream: Send + Sync + 'static {
    /// Begin delivering audio to `read`.
    fn start(&self);

    /// Blocking read of captured samples into `buf`.
    ///
    /// Blocks the calling worker until a full buffer is available. After
    /// `stop()`, drains whatever remains (possibly a short block) and then
    /// returns 0. Returns the number of samples written.
    fn read(&self, buf: &mut [i16]) -> usize;

    /// Stop capturing. Wakes any blocked `read`; no further audio is
    /// delivered after this returns.
    fn stop(&self);

    /// Release the underlying device resource. The stream is unusable
    /// afterwards.
    fn release(&self);
}

/// Factory for device-backed output streams. Mirror of [`InputProvider`].
pub trait OutputProvider {
    type Stream: OutputStream;

    /// Minimum playback buffer size, in frames, for `config`.
    fn min_buffer_frames(&self, config: &StreamConfig) -> Result<usize, EngineError>;

    /// Open an output stream for `config`.
    fn open_output(&self, config: &StreamConfig) -> Result<Self::Stream, EngineError>;
}

/// A device-backed playback stream.
pub trait OutputStream: Send + Sync + 'static {
    /// Begin consuming queued samples.
    fn start(&self);

    /// Blocking write of `samples` to the device.
    ///
    /// Returns once the device has consumed everything, or early when the
    /// stream is stopped mid-write.
    fn write(&self, samples: &[i16]);

    /// Stop playback. Discards anything still queued and wakes a blocked
    /// `write`.
    fn stop(&self);

    /// Release the underlying device resource.
    fn release(&self);
}
