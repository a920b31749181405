//! Asynchronous batched delivery of transitions to an analytics backend.
//!
//! ```text
//!   tick loop                          worker thread
//!   ─────────                          ─────────────
//!   record() ─► buffer ─(≥ min)─► JSON ─► [bounded queue] ─► BatchDelivery::deliver
//! ```
//!
//! The tick loop never blocks on delivery.  A batch that finds the queue
//! full is dropped with a warning, and a failed delivery is logged and
//! dropped on the worker.  Buffers smaller than the minimum batch are held
//! until they grow or the reporter finishes.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};

use crate::sink::TransitionSink;
use crate::{OutputError, OutputResult, TransitionRecord};

/// Buffers smaller than this are deferred.
pub const MIN_BATCH: usize = 10;

/// Serialised batches waiting for the worker.
pub const QUEUE_CAPACITY: usize = 50;

/// Where serialised batches go, e.g. an HTTP client posting to the
/// analytics endpoint.  Runs on the reporter's worker thread.
pub trait BatchDelivery: Send + 'static {
    /// Deliver one JSON array of [`TransitionRecord`]s.
    fn deliver(&mut self, body: &str) -> OutputResult<()>;
}

impl<F> BatchDelivery for F
where
    F: FnMut(&str) -> OutputResult<()> + Send + 'static,
{
    fn deliver(&mut self, body: &str) -> OutputResult<()> {
        self(body)
    }
}

// ── BatchingReporter ──────────────────────────────────────────────────────────

pub struct BatchingReporter {
    buffer:    Vec<TransitionRecord>,
    min_batch: usize,
    queue:     Option<Sender<String>>,
    worker:    Option<JoinHandle<()>>,
    dropped:   usize,
}

impl BatchingReporter {
    /// Start a reporter with the default batch size and queue capacity.
    pub fn new<D: BatchDelivery>(delivery: D) -> OutputResult<Self> {
        Self::with_limits(delivery, MIN_BATCH, QUEUE_CAPACITY)
    }

    pub fn with_limits<D: BatchDelivery>(mut delivery: D, min_batch: usize, capacity: usize) -> OutputResult<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<String>(capacity);
        let worker = thread::Builder::new()
            .name("transition-reporter".into())
            .spawn(move || {
                for body in rx {
                    if let Err(e) = delivery.deliver(&body) {
                        log::warn!("transition batch delivery failed: {e}");
                    }
                }
            })?;

        Ok(Self {
            buffer: Vec::new(),
            min_batch: min_batch.max(1),
            queue: Some(tx),
            worker: Some(worker),
            dropped: 0,
        })
    }

    /// Records waiting for the buffer to reach the minimum batch.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Batches discarded because the queue was full or closed.
    pub fn dropped_batches(&self) -> usize {
        self.dropped
    }

    /// Serialise the buffer and hand it to the worker without blocking.
    fn send_buffer(&mut self) -> OutputResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let body = serde_json::to_string(&self.buffer)?;
        let count = self.buffer.len();
        self.buffer.clear();

        let Some(queue) = &self.queue else {
            self.dropped += 1;
            return Ok(());
        };
        match queue.try_send(body) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                log::warn!("report queue full: dropped a batch of {count} transitions");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                log::warn!("report worker gone: dropped a batch of {count} transitions");
            }
        }
        Ok(())
    }

    /// Send what is buffered, close the queue and wait for the worker to
    /// drain it.
    fn shutdown(&mut self) -> OutputResult<()> {
        let flushed = self.send_buffer();
        self.queue = None;
        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| OutputError::WorkerPanicked)?;
        }
        flushed
    }
}

impl TransitionSink for BatchingReporter {
    fn record(&mut self, transitions: &[TransitionRecord]) -> OutputResult<()> {
        self.buffer.extend_from_slice(transitions);
        if self.buffer.len() >= self.min_batch {
            self.send_buffer()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.shutdown()
    }
}

impl Drop for BatchingReporter {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.shutdown() {
                log::warn!("transition reporter shutdown: {e}");
            }
        }
    }
}
