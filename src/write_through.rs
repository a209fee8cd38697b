//! Fire-and-forget persistence of store snapshots.
//!
//! Store commands call [`WriteThrough::persist`] right after they mutate
//! in-memory state. The snapshot is serialized on the caller's thread and
//! queued on an unbounded channel; a single background worker drains the
//! queue and hands each document to the storage backend. Because there is
//! exactly one worker per handle, writes complete in the order they were
//! issued and the last issued write is the one that stays on disk.
//!
//! Failures are logged and dropped. Nothing is retried and nothing is
//! reported back to the caller.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::{FinTrackError, Result};

#[cfg(feature = "blocking")]
use crate::storage::BlockingStorage;
#[cfg(feature = "async")]
use crate::storage::Storage;

/// Work item for the background writer.
#[derive(Debug)]
enum Command {
    /// Store (or clear, when `None`) a document.
    Save {
        /// Storage key.
        key: &'static str,
        /// Serialized snapshot.
        value: Option<Value>,
    },
    /// Acknowledge once every earlier command has been processed.
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer shared by both stores.
///
/// Cloning is cheap; all clones feed the same queue.
#[derive(Debug, Clone)]
pub struct WriteThrough {
    /// Queue into the worker, or `None` for a detached handle.
    sender: Option<mpsc::UnboundedSender<Command>>,
}

impl WriteThrough {
    /// Starts a writer task on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`FinTrackError::WriterUnavailable`] when called outside a
    /// tokio runtime.
    #[cfg(feature = "async")]
    #[inline]
    pub fn spawn<S: Storage + 'static>(storage: S) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|err| FinTrackError::WriterUnavailable(err.to_string()))?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let _task = handle.spawn(run_async(storage, receiver));
        tracing::debug!("spawned async write-through worker");
        Ok(Self {
            sender: Some(sender),
        })
    }

    /// Starts a writer on a dedicated OS thread.
    ///
    /// # Errors
    ///
    /// Returns [`FinTrackError::WriterUnavailable`] if the thread cannot be
    /// spawned.
    #[cfg(feature = "blocking")]
    #[inline]
    pub fn spawn_thread<S: BlockingStorage + 'static>(storage: S) -> Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let _thread = std::thread::Builder::new()
            .name("fintrack-writer".to_owned())
            .spawn(move || run_blocking(&storage, receiver))
            .map_err(|err| FinTrackError::WriterUnavailable(err.to_string()))?;
        tracing::debug!("spawned blocking write-through worker");
        Ok(Self {
            sender: Some(sender),
        })
    }

    /// Returns a handle that persists nothing. State lives in memory only.
    #[inline]
    #[must_use]
    pub const fn detached() -> Self {
        Self { sender: None }
    }

    /// Returns `true` if this handle feeds a background writer.
    #[inline]
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.sender.is_some()
    }

    /// Serializes `snapshot` and queues it for `key`. `None` clears the key.
    ///
    /// Never blocks and never fails from the caller's point of view.
    pub(crate) fn persist<T: Serialize>(&self, key: &'static str, snapshot: Option<&T>) {
        let value = match snapshot.map(serde_json::to_value).transpose() {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(key = %key, error = %err, "failed to serialize snapshot");
                return;
            }
        };
        let Some(sender) = self.sender.as_ref() else {
            tracing::trace!(key = %key, "detached write-through, snapshot dropped");
            return;
        };
        if sender.send(Command::Save { key, value }).is_err() {
            tracing::error!(key = %key, "write-through worker stopped, snapshot dropped");
        }
    }

    /// Waits until every write queued before this call has completed.
    ///
    /// Returns immediately for a detached handle or a stopped worker.
    #[inline]
    pub async fn flush(&self) {
        if let Some(done) = self.request_flush() {
            let _acked = done.await;
        }
    }

    /// Blocking counterpart of [`Self::flush`].
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context;
    /// use [`Self::flush`] there.
    #[inline]
    pub fn flush_blocking(&self) {
        if let Some(done) = self.request_flush() {
            let _acked = done.blocking_recv();
        }
    }

    /// Queues a flush marker and returns the acknowledgement receiver.
    fn request_flush(&self) -> Option<oneshot::Receiver<()>> {
        let sender = self.sender.as_ref()?;
        let (ack, done) = oneshot::channel();
        sender.send(Command::Flush(ack)).ok()?;
        Some(done)
    }
}

/// Logs a failed durable write.
fn log_failure(key: &str, err: &FinTrackError) {
    tracing::error!(key = %key, error = %err, "write-through failed");
}

/// Drains the queue on a tokio task.
#[cfg(feature = "async")]
async fn run_async<S: Storage>(storage: S, mut receiver: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Save { key, value } => {
                if let Err(err) = storage.save(key, value).await {
                    log_failure(key, &err);
                }
            }
            Command::Flush(ack) => {
                let _acked = ack.send(());
            }
        }
    }
    tracing::debug!("async write-through worker stopped");
}

/// Drains the queue on a dedicated thread.
#[cfg(feature = "blocking")]
fn run_blocking<S: BlockingStorage>(storage: &S, mut receiver: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = receiver.blocking_recv() {
        match command {
            Command::Save { key, value } => {
                if let Err(err) = storage.save(key, value) {
                    log_failure(key, &err);
                }
            }
            Command::Flush(ack) => {
                let _acked = ack.send(());
            }
        }
    }
    tracing::debug!("blocking write-through worker stopped");
}
