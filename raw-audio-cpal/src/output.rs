//! cpal playback stream.
//!
//! Mirror of the input side: a dedicated thread owns the `cpal::Stream`,
//! the device callback drains a pending-sample queue (silence when idle or
//! underrun), and `write` blocks on a condvar until the queue is empty or
//! the stream is stopped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::{Condvar, Mutex};

use raw_audio_core::models::config::StreamConfig;
use raw_audio_core::models::error::EngineError;
use raw_audio_core::traits::provider::{OutputProvider, OutputStream};

use crate::backend::{min_buffer_frames_from, stream_config, CpalBackend};

struct OutputShared {
    playing: AtomicBool,
    alive: AtomicBool,
    pending: Mutex<VecDeque<i16>>,
    drained: Condvar,
}

/// Device-backed playback stream.
pub struct CpalOutputStream {
    shared: Arc<OutputShared>,
    owner: Mutex<Option<thread::JoinHandle<()>>>,
}

impl OutputProvider for CpalBackend {
    type Stream = CpalOutputStream;

    fn min_buffer_frames(&self, config: &StreamConfig) -> Result<usize, EngineError> {
        let device = self.output_device().map_err(EngineError::Configuration)?;
        let ranges = device
            .supported_output_configs()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        min_buffer_frames_from(config, ranges)
    }

    fn open_output(&self, config: &StreamConfig) -> Result<Self::Stream, EngineError> {
        let device = self.output_device().map_err(EngineError::Initialization)?;
        let cpal_config = stream_config(config);

        let shared = Arc::new(OutputShared {
            playing: AtomicBool::new(false),
            alive: AtomicBool::new(true),
            pending: Mutex::new(VecDeque::new()),
            drained: Condvar::new(),
        });

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_shared = Arc::clone(&shared);
        let owner = thread::Builder::new()
            .name("cpal-output".into())
            .spawn(move || {
                let data_shared = Arc::clone(&thread_shared);
                let built = device.build_output_stream(
                    &cpal_config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        let mut pending = data_shared.pending.lock();
                        if !data_shared.playing.load(Ordering::Relaxed) {
                            data.fill(0);
                            return;
                        }
                        for slot in data.iter_mut() {
                            // Underrun fills with silence.
                            *slot = pending.pop_front().unwrap_or(0);
                        }
                        if pending.is_empty() {
                            data_shared.drained.notify_all();
                        }
                    },
                    |err| log::error!("output stream error: {}", err),
                    None,
                );

                let stream = match built {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                while thread_shared.alive.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(10));
                }
                drop(stream);
            })
            .map_err(|e| EngineError::Initialization(format!("failed to spawn stream thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(CpalOutputStream {
                shared,
                owner: Mutex::new(Some(owner)),
            }),
            Ok(Err(e)) => {
                let _ = owner.join();
                Err(EngineError::Initialization(e))
            }
            Err(_) => {
                let _ = owner.join();
                Err(EngineError::Initialization("stream thread died during setup".into()))
            }
        }
    }
}

impl OutputStream for CpalOutputStream {
    fn start(&self) {
        self.shared.playing.store(true, Ordering::SeqCst);
    }

    fn write(&self, samples: &[i16]) {
        let mut pending = self.shared.pending.lock();
        pending.extend(samples.iter().copied());
        while !pending.is_empty() && self.shared.playing.load(Ordering::SeqCst) {
            self.shared.drained.wait(&mut pending);
        }
    }

    fn stop(&self) {
        // Flip the flag under the queue lock so a writer between its check
        // and its wait cannot miss the wakeup.
        let mut pending = self.shared.pending.lock();
        self.shared.playing.store(false, Ordering::SeqCst);
        pending.clear();
        self.shared.drained.notify_all();
    }

    fn release(&self) {
        self.stop();
        self.shared.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.owner.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CpalOutputStream {
    fn drop(&mut self) {
        self.release();
    }
}
