/// Callback for captured sample blocks.
///
/// Invoked synchronously on the capture worker thread with every block read
/// from the device — keep it cheap, and marshal to another thread yourself
/// if the consumer needs one. The block is borrowed; copy it out if it must
/// outlive the call.
pub trait BufferObserver: Send + Sync {
    fn on_buffer(&self, block: &[i16]);
}

/// Callbacks for playback transitions.
///
/// `on_play` fires from whichever thread called `play()`; `on_stop` fires
/// from whichever thread triggered the stop — the caller's on an external
/// `stop()`, the playback worker's at end of file or on a read failure.
/// Thread marshaling is the implementor's responsibility.
pub trait PlaybackObserver: Send + Sync {
    fn on_play(&self);
    fn on_stop(&self);
}
