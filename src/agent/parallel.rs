//! Parallel agent
//!
//! Wraps any agent so that its callback runs on a dedicated worker thread fed
//! by a bounded FIFO queue. Publishers block while the queue is full, which
//! gives the dataflow natural backpressure.
//!
//! Shutdown drains: once `close` is called no new items are accepted, the
//! worker processes everything already queued, and `close` returns only after
//! the worker has exited.

use super::wiring::register;
use super::{Agent, AgentHandle};
use crate::error::AgentError;
use crate::message::Message;
use crate::registry::TopicRegistry;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopping,
    Stopped,
}

struct QueuedMessage {
    topic: String,
    message: Message,
}

/// Asynchronous decorator around an agent.
pub struct ParallelAgent {
    inner: AgentHandle,
    capacity: usize,
    queue: Sender<QueuedMessage>,
    /// Dropped to signal shutdown; never sent on.
    shutdown: Mutex<Option<Sender<()>>>,
    /// Disconnects once `shutdown` is dropped; wakes blocked publishers.
    shutdown_signal: Receiver<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
    state: RwLock<WorkerState>,
    /// Items queued or being processed.
    pending: Arc<AtomicUsize>,
}

impl ParallelAgent {
    /// Wrap `inner` and take over its topic registrations.
    ///
    /// The decorator shares the inner agent's UUID, so registering it replaces
    /// the inner agent in every subscriber and publisher set of `registry`.
    pub fn new(
        inner: AgentHandle,
        capacity: usize,
        registry: &TopicRegistry,
    ) -> Result<Arc<Self>, AgentError> {
        if capacity == 0 {
            return Err(AgentError::InvalidCapacity(capacity));
        }

        let (queue_tx, queue_rx) = bounded::<QueuedMessage>(capacity);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let pending = Arc::new(AtomicUsize::new(0));

        let worker_inner = Arc::clone(&inner);
        let worker_stop = shutdown_rx.clone();
        let worker_pending = Arc::clone(&pending);
        let short_id: String = inner.uuid().to_string().chars().take(8).collect();
        let worker = thread::Builder::new()
            .name(format!("{}-{}", inner.name(), short_id))
            .spawn(move || Self::worker_loop(worker_inner, queue_rx, worker_stop, worker_pending))
            .map_err(|e| AgentError::WorkerSpawn {
                agent: inner.name().to_string(),
                cause: e.to_string(),
            })?;

        let agent = Arc::new(Self {
            inner,
            capacity,
            queue: queue_tx,
            shutdown: Mutex::new(Some(shutdown_tx)),
            shutdown_signal: shutdown_rx,
            worker: Mutex::new(Some(worker)),
            state: RwLock::new(WorkerState::Running),
            pending,
        });

        let handle: AgentHandle = agent.clone();
        register(
            registry,
            agent.inner.subscriptions(),
            agent.inner.publications(),
            &handle,
        );
        debug!(
            agent = %agent.inner.name(),
            uuid = %agent.inner.uuid(),
            capacity,
            "Started parallel agent"
        );
        Ok(agent)
    }

    pub fn inner(&self) -> &AgentHandle {
        &self.inner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Number of items queued or currently being processed.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    fn worker_loop(
        inner: AgentHandle,
        queue: Receiver<QueuedMessage>,
        stop: Receiver<()>,
        pending: Arc<AtomicUsize>,
    ) {
        debug!(agent = %inner.name(), "Worker started");

        loop {
            select! {
                recv(queue) -> item => match item {
                    Ok(item) => Self::process(&inner, item, &pending),
                    Err(_) => break,
                },
                recv(stop) -> _ => break,
            }
        }

        let mut drained = 0usize;
        while let Ok(item) = queue.try_recv() {
            Self::process(&inner, item, &pending);
            drained += 1;
        }

        debug!(agent = %inner.name(), drained, "Worker stopped");
    }

    fn process(inner: &AgentHandle, item: QueuedMessage, pending: &AtomicUsize) {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            inner.callback(&item.topic, &item.message)
        }));
        if outcome.is_err() {
            error!(
                agent = %inner.name(),
                uuid = %inner.uuid(),
                topic = %item.topic,
                "Agent callback panicked; message discarded"
            );
        }
        release(pending);
    }
}

/// Decrement `pending` without wrapping below zero. `close` resets the
/// counter, so a publisher that raced it may release after the reset.
fn release(pending: &AtomicUsize) {
    let _ = pending.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}

impl Agent for ParallelAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn uuid(&self) -> Uuid {
        self.inner.uuid()
    }

    fn reset(&self) {
        self.inner.reset();
    }

    /// Enqueue the message for the worker, blocking while the queue is full.
    fn callback(&self, topic: &str, message: &Message) {
        if self.state() != WorkerState::Running {
            debug!(agent = %self.name(), topic = %topic, "Agent is shutting down, message dropped");
            return;
        }

        let item = QueuedMessage {
            topic: topic.to_string(),
            message: message.clone(),
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        select! {
            send(self.queue, item) -> sent => {
                if sent.is_err() {
                    release(&self.pending);
                    warn!(agent = %self.name(), topic = %topic, "Worker gone, message dropped");
                }
            }
            recv(self.shutdown_signal) -> _ => {
                release(&self.pending);
                warn!(agent = %self.name(), topic = %topic, "Shutdown while waiting for queue space, message dropped");
            }
        }
    }

    /// Detach from topics, stop the worker after it drains the queue, and
    /// wait for it to exit.
    fn close(&self) {
        let Some(shutdown) = self.shutdown.lock().take() else {
            return;
        };

        self.inner.close();
        *self.state.write() = WorkerState::Stopping;
        drop(shutdown);

        if let Some(worker) = self.worker.lock().take() {
            // Last handle released on our own worker: it exits after the drain.
            if worker.thread().id() == thread::current().id() {
                debug!(agent = %self.name(), "Closed from its own worker, not joining");
            } else if worker.join().is_err() {
                error!(agent = %self.name(), "Worker thread panicked");
            }
        }

        *self.state.write() = WorkerState::Stopped;
        // Items that raced past the state check after the drain are discarded.
        self.pending.store(0, Ordering::SeqCst);
        info!(agent = %self.name(), uuid = %self.uuid(), "Parallel agent closed");
    }

    fn equation(&self) -> Message {
        self.inner.equation()
    }

    fn subscriptions(&self) -> &[String] {
        self.inner.subscriptions()
    }

    fn publications(&self) -> &[String] {
        self.inner.publications()
    }
}

impl Drop for ParallelAgent {
    fn drop(&mut self) {
        self.close();
    }
}
