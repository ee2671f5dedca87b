//! FIFO request queue with a single in-flight operation.

use crate::{QueueConfig, exponential_backoff, reset_wait};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, error, instrument, warn};
use warbler_error::{PlatformError, PlatformErrorKind, WarblerError, WarblerResult};

/// Type-erased operation waiting in the queue.
#[async_trait]
trait QueuedOperation: Send {
    /// Run the operation once. On success the result is delivered to the
    /// submitter and `None` is returned; on failure the error is handed back
    /// so the queue can decide whether to try again.
    async fn attempt(&mut self) -> Option<WarblerError>;

    /// Deliver a final failure to the submitter.
    fn reject(self: Box<Self>, error: WarblerError);
}

struct Pending<F, T> {
    operation: F,
    reply: Option<oneshot::Sender<WarblerResult<T>>>,
}

#[async_trait]
impl<F, Fut, T> QueuedOperation for Pending<F, T>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = WarblerResult<T>> + Send,
    T: Send,
{
    async fn attempt(&mut self) -> Option<WarblerError> {
        match (self.operation)().await {
            Ok(value) => {
                if let Some(reply) = self.reply.take() {
                    // Submitter may have stopped waiting
                    let _ = reply.send(Ok(value));
                }
                None
            }
            Err(e) => Some(e),
        }
    }

    fn reject(mut self: Box<Self>, error: WarblerError) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Err(error));
        }
    }
}

struct Slot {
    operation: Box<dyn QueuedOperation>,
    retries: u32,
    idempotent: bool,
}

#[derive(Default)]
struct QueueState {
    slots: VecDeque<Slot>,
    draining: bool,
}

struct QueueInner {
    config: QueueConfig,
    state: Mutex<QueueState>,
}

/// Serializes all remote calls of one account.
///
/// Operations run one at a time in submission order. After each operation
/// the queue sleeps a random delay drawn from the configured range, so
/// consecutive calls never hit the platform back to back. A rate-limited
/// operation is put back at the head of the queue and nothing else runs until
/// it has been retried.
///
/// Clones share the same queue. The drain task is spawned on demand and exits
/// once the queue is empty, so an idle queue holds no task.
///
/// # Example
///
/// ```rust,no_run
/// use warbler_rate_limit::{QueueConfig, RequestQueue};
///
/// # async fn example() -> warbler_error::WarblerResult<()> {
/// let queue = RequestQueue::new(QueueConfig::default());
/// let answer = queue.submit(|| async { Ok(42) }).await?;
/// assert_eq!(answer, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<QueueInner>,
}

impl std::fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RequestQueue {
    /// Create an empty queue.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                config,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// The queue's pacing configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Number of operations waiting, not counting the one in flight.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.slots.len()
    }

    /// True when nothing is waiting and no drain task is running.
    pub async fn is_idle(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.slots.is_empty() && !state.draining
    }

    /// Enqueue an operation and wait for its final outcome.
    ///
    /// The operation may be invoked more than once when it is rate limited or
    /// fails transiently, so it must build a fresh future on every call.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error once the queue gives up on it.
    pub async fn submit<F, Fut, T>(&self, operation: F) -> WarblerResult<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.enqueue(operation, true).await
    }

    /// Enqueue an operation that must not take effect twice, such as
    /// publishing a post.
    ///
    /// Rate limits and failures the platform reported are retried as with
    /// [`submit`](Self::submit). A failure after which the request may
    /// already have reached the platform, like a timeout, is returned to the
    /// caller instead of being retried.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error once the queue gives up on it.
    pub async fn submit_once<F, Fut, T>(&self, operation: F) -> WarblerResult<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.enqueue(operation, false).await
    }

    async fn enqueue<F, Fut, T>(&self, operation: F, idempotent: bool) -> WarblerResult<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let slot = Slot {
            operation: Box::new(Pending {
                operation,
                reply: Some(reply),
            }),
            retries: 0,
            idempotent,
        };

        let spawn_drain = {
            let mut state = self.inner.state.lock().await;
            state.slots.push_back(slot);
            debug!(queued = state.slots.len(), idempotent, "Operation enqueued");
            !std::mem::replace(&mut state.draining, true)
        };

        if spawn_drain {
            tokio::spawn(Arc::clone(&self.inner).supervise());
        }

        match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(PlatformError::new(PlatformErrorKind::Unavailable(
                "request queue dropped the operation".to_string(),
            ))
            .into()),
        }
    }
}

impl QueueInner {
    /// Keep draining until a pass ends with an empty queue.
    ///
    /// Each pass runs in its own task. A panicking operation ends the pass;
    /// its submitter sees the dropped reply channel as an error and the next
    /// pass picks up the remaining slots.
    async fn supervise(self: Arc<Self>) {
        loop {
            match tokio::spawn(Arc::clone(&self).drain()).await {
                Ok(()) => return,
                Err(e) if e.is_panic() => {
                    error!("Queued operation panicked, resuming with the next one");
                    tokio::time::sleep(self.config.inter_request_delay()).await;
                }
                Err(_) => {
                    self.state.lock().await.draining = false;
                    return;
                }
            }
        }
    }

    async fn drain(self: Arc<Self>) {
        debug!("Request queue draining");
        loop {
            let slot = {
                let mut state = self.state.lock().await;
                match state.slots.pop_front() {
                    Some(slot) => slot,
                    None => {
                        state.draining = false;
                        debug!("Request queue idle");
                        return;
                    }
                }
            };

            self.run(slot).await;
            tokio::time::sleep(self.config.inter_request_delay()).await;
        }
    }

    #[instrument(skip_all, fields(retries = slot.retries))]
    async fn run(&self, mut slot: Slot) {
        let Some(error) = slot.operation.attempt().await else {
            return;
        };

        if error.is_rate_limited() {
            let reset = error.rate_limit_reset();
            let depth = self.requeue_front(slot).await;
            let wait = match reset {
                Some(reset) => reset_wait(
                    reset,
                    chrono::Utc::now().timestamp(),
                    self.config.reset_buffer(),
                ),
                None => self.backoff(depth),
            };
            warn!(?reset, wait_ms = millis(wait), depth, "Rate limited, requeued at head");
            tokio::time::sleep(wait).await;
        } else if error.is_retryable()
            && slot.retries < *self.config.max_retries()
            && (slot.idempotent || !error.is_delivery_uncertain())
        {
            slot.retries += 1;
            let depth = self.requeue_front(slot).await;
            let wait = self.backoff(depth);
            warn!(error = %error, wait_ms = millis(wait), depth, "Transient failure, retrying");
            tokio::time::sleep(wait).await;
        } else {
            error!(error = %error, "Operation failed");
            slot.operation.reject(error);
        }
    }

    /// Put a slot back at the head and return the resulting queue depth.
    async fn requeue_front(&self, slot: Slot) -> u32 {
        let mut state = self.state.lock().await;
        state.slots.push_front(slot);
        u32::try_from(state.slots.len()).unwrap_or(u32::MAX)
    }

    fn backoff(&self, depth: u32) -> Duration {
        exponential_backoff(
            depth,
            self.config.backoff_base(),
            self.config.backoff_ceiling(),
        )
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
