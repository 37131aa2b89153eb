//! cpal capture stream.
//!
//! cpal delivers audio through callbacks and its streams are not `Send`, so
//! a dedicated thread owns the `cpal::Stream` for its whole life. The
//! callback appends samples to a shared ring buffer; `read` blocks on a
//! condvar until a full block is there, which gives the engine the blocking
//! pull semantics it is written against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::{Condvar, Mutex};

use raw_audio_core::models::config::StreamConfig;
use raw_audio_core::models::error::EngineError;
use raw_audio_core::processing::ring_buffer::RingBuffer;
use raw_audio_core::traits::provider::{InputProvider, InputStream};

use crate::backend::{min_buffer_frames_from, stream_config, CpalBackend};

struct InputShared {
    capturing: AtomicBool,
    alive: AtomicBool,
    ring: Mutex<RingBuffer>,
    readable: Condvar,
}

/// Device-backed capture stream.
pub struct CpalInputStream {
    shared: Arc<InputShared>,
    owner: Mutex<Option<thread::JoinHandle<()>>>,
}

impl InputProvider for CpalBackend {
    type Stream = CpalInputStream;

    fn min_buffer_frames(&self, config: &StreamConfig) -> Result<usize, EngineError> {
        let device = self.input_device().map_err(EngineError::Configuration)?;
        let ranges = device
            .supported_input_configs()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        min_buffer_frames_from(config, ranges)
    }

    fn open_input(&self, config: &StreamConfig) -> Result<Self::Stream, EngineError> {
        let device = self.input_device().map_err(EngineError::Initialization)?;
        let cpal_config = stream_config(config);

        // One second of buffered audio between the device callback and the
        // engine's reads; overflow drops oldest.
        let ring_capacity = config.sample_rate_hz as usize * config.samples_per_frame();
        let shared = Arc::new(InputShared {
            capturing: AtomicBool::new(false),
            alive: AtomicBool::new(true),
            ring: Mutex::new(RingBuffer::new(ring_capacity)),
            readable: Condvar::new(),
        });

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_shared = Arc::clone(&shared);
        let owner = thread::Builder::new()
            .name("cpal-input".into())
            .spawn(move || {
                let data_shared = Arc::clone(&thread_shared);
                let built = device.build_input_stream(
                    &cpal_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if !data_shared.capturing.load(Ordering::Relaxed) {
                            return;
                        }
                        data_shared.ring.lock().write(data);
                        data_shared.readable.notify_all();
                    },
                    |err| log::error!("input stream error: {}", err),
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

                // The stream lives exactly as long as this thread.
                while thread_shared.alive.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(10));
                }
                drop(stream);
            })
            .map_err(|e| EngineError::Initialization(format!("failed to spawn stream thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(CpalInputStream {
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

impl InputStream for CpalInputStream {
    fn start(&self) {
        self.shared.ring.lock().clear();
        self.shared.capturing.store(true, Ordering::SeqCst);
    }

    fn read(&self, buf: &mut [i16]) -> usize {
        let mut ring = self.shared.ring.lock();
        loop {
            if ring.len() >= buf.len() {
                return ring.read_into(buf);
            }
            if !self.shared.capturing.load(Ordering::SeqCst) {
                // Drain the tail; 0 once empty.
                return ring.read_into(buf);
            }
            self.shared.readable.wait(&mut ring);
        }
    }

    fn stop(&self) {
        // Flip the flag under the ring lock so a reader between its check
        // and its wait cannot miss the wakeup.
        let _ring = self.shared.ring.lock();
        self.shared.capturing.store(false, Ordering::SeqCst);
        self.shared.readable.notify_all();
    }

    fn release(&self) {
        self.stop();
        self.shared.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.owner.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        self.release();
    }
}
