use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::{CaptureSource, ChannelLayout, DeviceRole, SampleEncoding, StreamConfig};
use crate::models::error::EngineError;
use crate::models::state::RecorderState;
use crate::processing::pcm;
use crate::traits::observer::BufferObserver;
use crate::traits::provider::{InputProvider, InputStream};

/// Shared between the control surface and the capture worker, protected by
/// `parking_lot::Mutex` (state) and an atomic keep-running flag (loop
/// condition), so the worker never holds a lock across a blocking read.
struct RecorderShared<S> {
    config: StreamConfig,
    output_path: Option<PathBuf>,
    observer: Option<Arc<dyn BufferObserver>>,
    stream: S,
    buffer_frames: usize,
    state: Mutex<RecorderState>,
    running: AtomicBool,
}

impl<S: InputStream> RecorderShared<S> {
    /// `recording → idle`. Returns whether this call made the transition.
    ///
    /// Taken both by an external `stop_recording()` and by the worker when a
    /// file write fails. The state check-and-set runs under the lock; the
    /// stream stop happens after, so observer-side queries never deadlock.
    fn stop_capture(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.is_recording() {
                return false;
            }
            *state = RecorderState::Idle;
        }
        self.running.store(false, Ordering::SeqCst);
        self.stream.stop();
        true
    }
}

/// Capture engine: one input stream, at most one background worker.
///
/// Owns the stream for its whole life; built by [`RecorderBuilder`], driven
/// by `start_recording`/`stop_recording`, retired exactly once by
/// `release`. All control calls on a released engine are no-ops.
pub struct Recorder<S: InputStream> {
    shared: Arc<RecorderShared<S>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: InputStream> std::fmt::Debug for Recorder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.shared.state.lock())
            .field("config", &self.shared.config)
            .field("buffer_frames", &self.shared.buffer_frames)
            .finish_non_exhaustive()
    }
}

impl<S: InputStream> Recorder<S> {
    /// Begin capturing. No-op unless the engine is `Idle`.
    ///
    /// Starts the stream and launches the capture worker; returns without
    /// waiting for the worker's first read.
    pub fn start_recording(&mut self) {
        {
            let state = self.shared.state.lock();
            if !state.is_idle() {
                return;
            }
        }

        // Retire the previous session's worker before transitioning; it
        // exits promptly because its stream is stopped, and joining first
        // keeps its final idle transition out of the new session.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        *self.shared.state.lock() = RecorderState::Recording;
        self.shared.running.store(true, Ordering::SeqCst);
        self.shared.stream.start();

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("raw-audio-capture".into())
            .spawn(move || capture_loop(shared))
            .expect("failed to spawn capture thread");
        self.worker = Some(handle);
    }

    /// Stop capturing. No-op unless the engine is `Recording`.
    ///
    /// The stream stop is synchronous — no further audio is captured after
    /// this returns — but the call does not wait for the worker's final
    /// iteration.
    pub fn stop_recording(&mut self) {
        self.shared.stop_capture();
    }

    /// Stop if recording and release the stream. Idempotent; the engine is
    /// terminally `Released` afterwards.
    pub fn release(&mut self) {
        self.shared.stop_capture();

        let first_release = {
            let mut state = self.shared.state.lock();
            if state.is_released() {
                false
            } else {
                *state = RecorderState::Released;
                true
            }
        };
        if first_release {
            self.shared.stream.release();
        }

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    pub fn state(&self) -> RecorderState {
        *self.shared.state.lock()
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.shared.config
    }

    /// Capture block size in frames, as reported by the provider.
    pub fn buffer_frames(&self) -> usize {
        self.shared.buffer_frames
    }

    /// Where captured audio is persisted, if anywhere.
    pub fn output_path(&self) -> Option<&Path> {
        self.shared.output_path.as_deref()
    }
}

/// Worker loop: blocking read → file write → observer, until stopped.
///
/// File I/O failures never propagate to the caller; the loop stops the
/// engine through the same path as an external stop and returns.
fn capture_loop<S: InputStream>(shared: Arc<RecorderShared<S>>) {
    let block_len = shared.buffer_frames * shared.config.samples_per_frame();
    let mut buffer = vec![0i16; block_len];

    let mut writer = None;
    if let Some(path) = &shared.output_path {
        match File::create(path) {
            Ok(file) => writer = Some(BufWriter::new(file)),
            Err(e) => {
                log::warn!("cannot open {} for recording: {}", path.display(), e);
                shared.stop_capture();
                return;
            }
        }
    }

    while shared.running.load(Ordering::SeqCst) {
        let n = shared.stream.read(&mut buffer);
        if n == 0 {
            break;
        }
        let block = &buffer[..n];

        if let Some(w) = writer.as_mut() {
            if let Err(e) = w.write_all(&pcm::encode_samples(block)) {
                log::warn!("recording write failed, stopping capture: {}", e);
                break;
            }
        }

        if let Some(observer) = &shared.observer {
            observer.on_buffer(block);
        }
    }

    shared.stop_capture();

    if let Some(mut w) = writer {
        if let Err(e) = w.flush() {
            log::warn!("recording flush failed: {}", e);
        }
    }
}

/// Fluent construction surface for [`Recorder`].
///
/// `build()` validates the configuration against the provider exactly once
/// and either returns an `Idle` engine or fails without holding any
/// resources.
pub struct RecorderBuilder {
    sample_rate_hz: u32,
    channel_layout: ChannelLayout,
    encoding: SampleEncoding,
    source: CaptureSource,
    output_path: Option<PathBuf>,
    observer: Option<Arc<dyn BufferObserver>>,
}

impl RecorderBuilder {
    pub fn new() -> Self {
        Self {
            sample_rate_hz: 44_100,
            channel_layout: ChannelLayout::Mono,
            encoding: SampleEncoding::Pcm16,
            source: CaptureSource::Default,
            output_path: None,
            observer: None,
        }
    }

    /// Sample rate in Hertz (default: 44100).
    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate_hz = hz;
        self
    }

    /// Channel layout (default: mono).
    pub fn channel_layout(mut self, layout: ChannelLayout) -> Self {
        self.channel_layout = layout;
        self
    }

    /// Sample encoding (default: 16-bit PCM).
    pub fn encoding(mut self, encoding: SampleEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Capture source routing intent (default: device default).
    pub fn source(mut self, source: CaptureSource) -> Self {
        self.source = source;
        self
    }

    /// Path to persist raw audio to. Without one (or with an empty one),
    /// capture still runs but nothing is written to disk.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Observer receiving every captured block on the worker thread.
    pub fn observer(mut self, observer: Arc<dyn BufferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build<P: InputProvider>(self, provider: &P) -> Result<Recorder<P::Stream>, EngineError> {
        let config = StreamConfig {
            sample_rate_hz: self.sample_rate_hz,
            channel_layout: self.channel_layout,
            sample_encoding: self.encoding,
            device_role: DeviceRole::Capture(self.source),
        };
        config.validate().map_err(EngineError::Configuration)?;

        let buffer_frames = provider.min_buffer_frames(&config)?;
        let stream = provider.open_input(&config)?;

        let output_path = self.output_path.filter(|p| !p.as_os_str().is_empty());

        Ok(Recorder {
            shared: Arc::new(RecorderShared {
                config,
                output_path,
                observer: self.observer,
                stream,
                buffer_frames,
                state: Mutex::new(RecorderState::Idle),
                running: AtomicBool::new(false),
            }),
            worker: None,
        })
    }
}

impl Default for RecorderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Condvar;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Scripted device stand-in: serves queued blocks to blocking reads and
    /// keeps call counters for assertions.
    #[derive(Default)]
    struct ScriptedState {
        blocks: Mutex<VecDeque<Vec<i16>>>,
        capturing: AtomicBool,
        readable: Condvar,
        starts: AtomicUsize,
        stops: AtomicUsize,
        releases: AtomicUsize,
        opens: AtomicUsize,
    }

    struct ScriptedStream(Arc<ScriptedState>);

    impl InputStream for ScriptedStream {
        fn start(&self) {
            self.0.starts.fetch_add(1, Ordering::SeqCst);
            self.0.capturing.store(true, Ordering::SeqCst);
        }

        fn read(&self, buf: &mut [i16]) -> usize {
            let mut blocks = self.0.blocks.lock();
            loop {
                if let Some(block) = blocks.pop_front() {
                    let n = block.len().min(buf.len());
                    buf[..n].copy_from_slice(&block[..n]);
                    return n;
                }
                if !self.0.capturing.load(Ordering::SeqCst) {
                    return 0;
                }
                self.0.readable.wait(&mut blocks);
            }
        }

        fn stop(&self) {
            self.0.stops.fetch_add(1, Ordering::SeqCst);
            // Flip the flag under the lock so a reader between its check and
            // its wait cannot miss the wakeup.
            let _blocks = self.0.blocks.lock();
            self.0.capturing.store(false, Ordering::SeqCst);
            self.0.readable.notify_all();
        }

        fn release(&self) {
            self.0.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct MockProvider {
        buffer_frames: usize,
        reject_config: bool,
        fail_open: bool,
        state: Arc<ScriptedState>,
    }

    impl MockProvider {
        fn with_blocks(blocks: &[&[i16]]) -> Self {
            let state = ScriptedState::default();
            *state.blocks.lock() = blocks.iter().map(|b| b.to_vec()).collect();
            Self {
                buffer_frames: 4,
                reject_config: false,
                fail_open: false,
                state: Arc::new(state),
            }
        }
    }

    impl InputProvider for MockProvider {
        type Stream = ScriptedStream;

        fn min_buffer_frames(&self, _config: &StreamConfig) -> Result<usize, EngineError> {
            if self.reject_config {
                return Err(EngineError::Configuration("unsupported combination".into()));
            }
            Ok(self.buffer_frames)
        }

        fn open_input(&self, _config: &StreamConfig) -> Result<Self::Stream, EngineError> {
            if self.fail_open {
                return Err(EngineError::Initialization("stream not ready".into()));
            }
            self.state.opens.fetch_add(1, Ordering::SeqCst);
            Ok(ScriptedStream(Arc::clone(&self.state)))
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        calls: AtomicUsize,
        samples: Mutex<Vec<i16>>,
    }

    impl BufferObserver for CountingObserver {
        fn on_buffer(&self, block: &[i16]) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.samples.lock().extend_from_slice(block);
        }
    }

    fn wait_until(what: &str, cond: impl Fn() -> bool) {
        for _ in 0..400 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for {what}");
    }

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("raw_audio_recorder_test_{name}"))
    }

    #[test]
    fn build_succeeds_into_idle() {
        let provider = MockProvider::with_blocks(&[]);
        let recorder = RecorderBuilder::new().build(&provider).unwrap();

        assert_eq!(recorder.state(), RecorderState::Idle);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.buffer_frames(), 4);
        assert_eq!(recorder.config().sample_rate_hz, 44_100);
    }

    #[test]
    fn rejected_config_fails_without_opening_a_stream() {
        let mut provider = MockProvider::with_blocks(&[]);
        provider.reject_config = true;

        let err = RecorderBuilder::new().build(&provider).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert_eq!(provider.state.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_stream_open_is_initialization_error() {
        let mut provider = MockProvider::with_blocks(&[]);
        provider.fail_open = true;

        let err = RecorderBuilder::new().build(&provider).unwrap_err();
        assert!(matches!(err, EngineError::Initialization(_)));
    }

    #[test]
    fn zero_sample_rate_is_configuration_error() {
        let provider = MockProvider::with_blocks(&[]);
        let err = RecorderBuilder::new().sample_rate(0).build(&provider).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let provider = MockProvider::with_blocks(&[]);
        let state = Arc::clone(&provider.state);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.stop_recording();

        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(state.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn records_blocks_to_file_and_observer() {
        let provider = MockProvider::with_blocks(&[&[1, -2, 3, -4], &[100, 2000, -30000, 0]]);
        let observer = Arc::new(CountingObserver::default());
        let path = temp_file_path("roundtrip.pcm");

        let mut recorder = RecorderBuilder::new()
            .output_path(&path)
            .observer(Arc::clone(&observer) as Arc<dyn BufferObserver>)
            .build(&provider)
            .unwrap();

        recorder.start_recording();
        assert!(recorder.is_recording());
        wait_until("observer to see both blocks", || {
            observer.calls.load(Ordering::SeqCst) == 2
        });

        recorder.stop_recording();
        wait_until("file to hold both blocks", || {
            std::fs::read(&path).map(|b| b.len() == 16).unwrap_or(false)
        });

        let bytes = std::fs::read(&path).unwrap();
        let expected: Vec<i16> = vec![1, -2, 3, -4, 100, 2000, -30000, 0];
        assert_eq!(bytes, pcm::encode_samples(&expected));
        assert_eq!(pcm::decode_samples(&bytes), expected);
        assert_eq!(*observer.samples.lock(), expected);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn no_output_path_still_delivers_blocks() {
        let provider = MockProvider::with_blocks(&[&[7, 8, 9, 10]]);
        let observer = Arc::new(CountingObserver::default());

        let mut recorder = RecorderBuilder::new()
            .observer(Arc::clone(&observer) as Arc<dyn BufferObserver>)
            .build(&provider)
            .unwrap();
        assert!(recorder.output_path().is_none());

        recorder.start_recording();
        wait_until("observer to see the block", || {
            observer.calls.load(Ordering::SeqCst) == 1
        });
        recorder.stop_recording();

        assert_eq!(*observer.samples.lock(), vec![7, 8, 9, 10]);
    }

    #[test]
    fn empty_output_path_means_no_persistence() {
        let provider = MockProvider::with_blocks(&[]);
        let recorder = RecorderBuilder::new().output_path("").build(&provider).unwrap();
        assert!(recorder.output_path().is_none());
    }

    #[test]
    fn start_twice_starts_one_worker() {
        let provider = MockProvider::with_blocks(&[&[1, 2, 3, 4]]);
        let state = Arc::clone(&provider.state);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.start_recording();
        recorder.start_recording();

        assert_eq!(state.starts.load(Ordering::SeqCst), 1);
        recorder.stop_recording();
        wait_until("engine back to idle", || recorder.state() == RecorderState::Idle);
    }

    #[test]
    fn start_then_immediate_stop_never_stays_recording() {
        let provider = MockProvider::with_blocks(&[&[1, 2, 3, 4]]);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.start_recording();
        recorder.stop_recording();

        assert_eq!(recorder.state(), RecorderState::Idle);
        recorder.release();
        assert_eq!(recorder.state(), RecorderState::Released);
    }

    #[test]
    fn unwritable_output_path_stops_silently() {
        let provider = MockProvider::with_blocks(&[&[1, 2, 3, 4]]);
        let observer = Arc::new(CountingObserver::default());
        let path = temp_file_path("no-such-dir").join("capture.pcm");

        let mut recorder = RecorderBuilder::new()
            .output_path(&path)
            .observer(Arc::clone(&observer) as Arc<dyn BufferObserver>)
            .build(&provider)
            .unwrap();

        recorder.start_recording();
        wait_until("engine to self-stop", || recorder.state() == RecorderState::Idle);
        assert_eq!(observer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let provider = MockProvider::with_blocks(&[]);
        let state = Arc::clone(&provider.state);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.release();
        assert_eq!(recorder.state(), RecorderState::Released);
        recorder.release();
        assert_eq!(recorder.state(), RecorderState::Released);
        assert_eq!(state.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_while_recording_stops_first() {
        let provider = MockProvider::with_blocks(&[&[5, 6, 7, 8]]);
        let state = Arc::clone(&provider.state);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.start_recording();
        recorder.release();

        assert_eq!(recorder.state(), RecorderState::Released);
        assert_eq!(state.stops.load(Ordering::SeqCst), 1);
        assert_eq!(state.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn control_calls_after_release_are_noops() {
        let provider = MockProvider::with_blocks(&[]);
        let state = Arc::clone(&provider.state);
        let mut recorder = RecorderBuilder::new().build(&provider).unwrap();

        recorder.release();
        recorder.start_recording();
        recorder.stop_recording();

        assert_eq!(recorder.state(), RecorderState::Released);
        assert_eq!(state.starts.load(Ordering::SeqCst), 0);
    }
}
