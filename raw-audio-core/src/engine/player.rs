use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::{ChannelLayout, DeviceRole, PlaybackUsage, SampleEncoding, StreamConfig};
use crate::models::error::EngineError;
use crate::models::state::PlayerState;
use crate::processing::pcm;
use crate::traits::observer::PlaybackObserver;
use crate::traits::provider::{OutputProvider, OutputStream};

/// Shared between the control surface and the playback worker.
struct PlayerShared<S> {
    config: StreamConfig,
    source_path: PathBuf,
    observer: Option<Arc<dyn PlaybackObserver>>,
    stream: S,
    state: Mutex<PlayerState>,
}

impl<S: OutputStream> PlayerShared<S> {
    /// `playing → stopped`. Returns whether this call made the transition.
    ///
    /// The single convergence point for external stops, end-of-playback and
    /// read failures, so exactly one `on_stop` fires per play session. The
    /// check-and-set runs under the lock; the stream stop and the observer
    /// call happen after it is dropped.
    fn stop_playback(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.is_playing() {
                return false;
            }
            *state = PlayerState::Stopped;
        }
        self.stream.stop();
        if let Some(observer) = &self.observer {
            observer.on_stop();
        }
        true
    }
}

/// Playback engine: one output stream, at most one background worker.
///
/// Plays the configured source file in a single pass per `play()` call; the
/// file must be flat little-endian 16-bit PCM matching the configuration it
/// was recorded with.
pub struct Player<S: OutputStream> {
    shared: Arc<PlayerShared<S>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: OutputStream> std::fmt::Debug for Player<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.shared.state.lock())
            .field("config", &self.shared.config)
            .field("source_path", &self.shared.source_path)
            .finish_non_exhaustive()
    }
}

impl<S: OutputStream> Player<S> {
    /// Begin playback. No-op unless the engine is `Stopped`.
    ///
    /// Starts the output stream synchronously — `is_playing()` is already
    /// true when this returns — fires `on_play`, and hands the file to a
    /// background worker. A missing or unreadable source file is not an
    /// error here; the worker converges on the stop path by itself.
    pub fn play(&mut self) {
        {
            let state = self.shared.state.lock();
            if !state.is_stopped() {
                return;
            }
        }

        // Retire the previous session's worker before transitioning; it
        // exits promptly because its stream is stopped, and joining first
        // keeps its final stop transition out of the new session.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        *self.shared.state.lock() = PlayerState::Playing;
        self.shared.stream.start();
        if let Some(observer) = &self.shared.observer {
            observer.on_play();
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("raw-audio-playback".into())
            .spawn(move || playback_task(shared))
            .expect("failed to spawn playback thread");
        self.worker = Some(handle);
    }

    /// Stop playback. No-op unless the engine is `Playing`.
    pub fn stop(&mut self) {
        self.shared.stop_playback();
    }

    /// Stop if playing and release the stream. Idempotent; the engine is
    /// terminally `Released` afterwards.
    pub fn release(&mut self) {
        self.shared.stop_playback();

        let first_release = {
            let mut state = self.shared.state.lock();
            if state.is_released() {
                false
            } else {
                *state = PlayerState::Released;
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

    pub fn state(&self) -> PlayerState {
        *self.shared.state.lock()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.shared.config
    }

    pub fn source_path(&self) -> &Path {
        &self.shared.source_path
    }
}

/// Worker: read the whole file, one blocking stream write, then stop.
///
/// Missing file, read failure and normal completion all take the same stop
/// path; no error surfaces past the state change and `on_stop`.
fn playback_task<S: OutputStream>(shared: Arc<PlayerShared<S>>) {
    match fs::read(&shared.source_path) {
        Ok(bytes) => {
            let samples = pcm::decode_samples(&bytes);
            shared.stream.write(&samples);
        }
        Err(e) => {
            log::warn!(
                "cannot read playback source {}: {}",
                shared.source_path.display(),
                e
            );
        }
    }
    shared.stop_playback();
}

/// Fluent construction surface for [`Player`], keyed by the mandatory
/// source path.
pub struct PlayerBuilder {
    source_path: PathBuf,
    sample_rate_hz: u32,
    channel_layout: ChannelLayout,
    encoding: SampleEncoding,
    usage: PlaybackUsage,
    observer: Option<Arc<dyn PlaybackObserver>>,
}

impl PlayerBuilder {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            sample_rate_hz: 44_100,
            channel_layout: ChannelLayout::Mono,
            encoding: SampleEncoding::Pcm16,
            usage: PlaybackUsage::Media,
            observer: None,
        }
    }

    /// Sample rate in Hertz (default: 44100). Must match the recording.
    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate_hz = hz;
        self
    }

    /// Channel layout (default: mono). Must match the recording.
    pub fn channel_layout(mut self, layout: ChannelLayout) -> Self {
        self.channel_layout = layout;
        self
    }

    /// Sample encoding (default: 16-bit PCM).
    pub fn encoding(mut self, encoding: SampleEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Playback usage routing intent (default: media).
    pub fn usage(mut self, usage: PlaybackUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Observer notified of play/stop transitions.
    pub fn observer(mut self, observer: Arc<dyn PlaybackObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build<P: OutputProvider>(self, provider: &P) -> Result<Player<P::Stream>, EngineError> {
        if self.source_path.as_os_str().is_empty() {
            return Err(EngineError::Configuration("source path must not be empty".into()));
        }

        let config = StreamConfig {
            sample_rate_hz: self.sample_rate_hz,
            channel_layout: self.channel_layout,
            sample_encoding: self.encoding,
            device_role: DeviceRole::Playback(self.usage),
        };
        config.validate().map_err(EngineError::Configuration)?;

        // Device acceptance gate; the player streams the whole file in one
        // write, so the reported size is not used for chunking.
        provider.min_buffer_frames(&config)?;
        let stream = provider.open_output(&config)?;

        Ok(Player {
            shared: Arc::new(PlayerShared {
                config,
                source_path: self.source_path,
                observer: self.observer,
                stream,
                state: Mutex::new(PlayerState::Stopped),
            }),
            worker: None,
        })
    }
}
