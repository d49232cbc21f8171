//! Producer/consumer front end for a mix buffer
//!
//! Producers enqueue `SampleMixIn` requests into a bounded channel and a
//! single worker thread mixes them into a shared buffer. `flush` is a
//! polling drain, not a barrier: it waits until the queue is observed
//! empty and then stops the worker, so producers must stop submitting
//! before calling it. Requests that race in after the drain are dropped.
//! A worker panic is reported by `flush` instead of a partial buffer.

use crate::error::{MixError, MixResult};
use crate::mix_buffer::{MixBuffer, SampleMixIn};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DEFAULT_QUEUE_CAPACITY: usize = 32;
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Mix queue settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixQueueConfig {
    /// Bound on queued requests; `submit` blocks when full
    pub capacity: usize,
    /// Pin the worker to this core index, if present on the machine
    pub pin_to_core: Option<usize>,
}

impl Default for MixQueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            pin_to_core: None,
        }
    }
}

/// Single-worker mixing queue
pub struct MixQueue {
    tx: Sender<SampleMixIn>,
    buffer: Arc<Mutex<MixBuffer>>,
    running: Arc<AtomicBool>,
    mixed: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl MixQueue {
    /// Start a worker that mixes into `buffer`
    pub fn spawn(buffer: MixBuffer, config: MixQueueConfig) -> MixResult<Self> {
        let (tx, rx) = channel::bounded(config.capacity);
        let buffer = Arc::new(Mutex::new(buffer));
        let running = Arc::new(AtomicBool::new(true));
        let mixed = Arc::new(AtomicU64::new(0));

        let worker = Self::spawn_worker(
            rx,
            buffer.clone(),
            running.clone(),
            mixed.clone(),
            config.pin_to_core,
        )?;

        Ok(MixQueue {
            tx,
            buffer,
            running,
            mixed,
            worker: Some(worker),
        })
    }

    /// Producer handle; clone freely
    pub fn sender(&self) -> Sender<SampleMixIn> {
        self.tx.clone()
    }

    /// Enqueue a request, blocking while the queue is full
    pub fn submit(&self, mix_in: SampleMixIn) -> MixResult<()> {
        if !self.running.load(Ordering::Acquire) {
            return Err(MixError::QueueClosed);
        }
        self.tx.send(mix_in).map_err(|_| MixError::QueueClosed)
    }

    /// Requests waiting for the worker
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    pub fn stats(&self) -> MixQueueStats {
        MixQueueStats {
            mixed: self.mixed.load(Ordering::Relaxed),
            pending: self.pending(),
        }
    }

    /// Wait for the queue to drain, stop the worker and hand back the buffer
    pub fn flush(mut self) -> MixResult<MixBuffer> {
        while !self.tx.is_empty() {
            if self.worker.as_ref().map_or(true, |w| w.is_finished()) {
                log::warn!("mix worker gone with {} requests queued", self.tx.len());
                break;
            }
            thread::sleep(DRAIN_POLL_INTERVAL);
        }

        self.shutdown()?;
        Ok(std::mem::take(&mut *self.buffer.lock()))
    }

    fn shutdown(&mut self) -> MixResult<()> {
        self.running.store(false, Ordering::Release);

        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        if handle.join().is_err() {
            let mixed = self.mixed.load(Ordering::Relaxed);
            log::error!("Mix worker panicked after {} mix-ins", mixed);
            return Err(MixError::WorkerPanicked { mixed });
        }
        Ok(())
    }

    fn spawn_worker(
        rx: Receiver<SampleMixIn>,
        buffer: Arc<Mutex<MixBuffer>>,
        running: Arc<AtomicBool>,
        mixed: Arc<AtomicU64>,
        pin_to_core: Option<usize>,
    ) -> MixResult<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("tracker-mix-worker".to_string())
            .spawn(move || {
                if let Some(index) = pin_to_core {
                    pin_current_thread(index);
                }

                while running.load(Ordering::Acquire) {
                    match rx.recv_timeout(WORKER_POLL_INTERVAL) {
                        Ok(mix_in) => {
                            buffer.lock().mix_in_sample(mix_in);
                            mixed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                log::info!(
                    "Mix worker exiting after {} mix-ins",
                    mixed.load(Ordering::Relaxed)
                );
            })?;

        Ok(handle)
    }
}

fn pin_current_thread(index: usize) {
    let core = core_affinity::get_core_ids().and_then(|ids| ids.into_iter().nth(index));
    match core {
        Some(core) if core_affinity::set_for_current(core) => {
            log::debug!("Mix worker pinned to core {}", index);
        }
        _ => log::warn!("Could not pin mix worker to core {}", index),
    }
}

impl Drop for MixQueue {
    fn drop(&mut self) {
        // already logged
        let _ = self.shutdown();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixQueueStats {
    pub mixed: u64,
    pub pending: usize,
}
