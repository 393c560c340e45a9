//! The live-update stream.
//!
//! Many producers push [`Update`]s into one bounded channel; exactly one
//! reader drains it in arrival order. Producers wait when the channel is
//! full, nothing is dropped.
//!
//! ```text
//!   store forwarder ──┐
//!   group notifier  ──┼──► [ bounded FIFO ] ──► Updates::next()
//!   transport state ──┘
//! ```
//!
//! Lifecycle: Open → (shutdown) Draining → (buffer empty) Finished. Once
//! the reader has seen [`Update::Finished`], every later `next()` returns it
//! again immediately.
//!
//! A push that returns `Ok` is always delivered before the terminal marker:
//! pushes hold a shared gate across the send and shutdown takes it
//! exclusively, so shutdown waits for pushes already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use roost_types::Update;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

/// Events buffered before producers start waiting.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Update stream errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// Push after the stream was shut down.
    #[error("update stream is shut down")]
    ShutDown,

    /// The reader was dropped.
    #[error("update reader is gone")]
    ReaderGone,
}

enum Item {
    Update(Update),
    Finish,
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Update(update) => write!(f, "Update({:?})", update.kind()),
            Item::Finish => f.write_str("Finish"),
        }
    }
}

/// Create a connected sender/reader pair.
///
/// # Panics
///
/// Panics if `capacity` is zero, as [`tokio::sync::mpsc::channel`] does.
pub fn channel(capacity: usize) -> (UpdateSender, Updates) {
    let (tx, rx) = mpsc::channel(capacity);
    let sender = UpdateSender {
        tx,
        gate: Arc::new(RwLock::new(())),
        shut_down: Arc::new(AtomicBool::new(false)),
    };
    let updates = Updates {
        rx,
        finished: false,
    };
    (sender, updates)
}

/// Producer handle. Clone one per producer.
#[derive(Clone)]
pub struct UpdateSender {
    tx: mpsc::Sender<Item>,
    gate: Arc<RwLock<()>>,
    shut_down: Arc<AtomicBool>,
}

impl std::fmt::Debug for UpdateSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSender")
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl UpdateSender {
    /// Push an update, waiting while the buffer is full.
    ///
    /// Pushing [`Update::Finished`] shuts the stream down.
    pub async fn push(&self, update: Update) -> Result<(), UpdateError> {
        if update.is_finished() {
            return self.shutdown().await;
        }
        let _open = self.gate.read().await;
        if self.is_shut_down() {
            tracing::error!("Update pushed after shutdown: {:?}", update.kind());
            return Err(UpdateError::ShutDown);
        }
        self.tx
            .send(Item::Update(update))
            .await
            .map_err(|_| UpdateError::ReaderGone)
    }

    /// Queue the terminal marker behind everything already buffered.
    ///
    /// Waits for pushes already in flight. Calling this more than once is
    /// harmless.
    pub async fn shutdown(&self) -> Result<(), UpdateError> {
        let _closing = self.gate.write().await;
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("Update stream shutting down");
        // A reader that is already gone has nothing left to drain.
        let _ = self.tx.send(Item::Finish).await;
        Ok(())
    }

    /// Whether shutdown has been requested by any producer.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

/// The single reader. Not cloneable.
#[derive(Debug)]
pub struct Updates {
    rx: mpsc::Receiver<Item>,
    finished: bool,
}

impl Updates {
    /// Next update in arrival order, or [`Update::Finished`] once the stream
    /// has ended.
    ///
    /// The stream also ends when every sender has been dropped.
    pub async fn next(&mut self) -> Update {
        if self.finished {
            return Update::Finished;
        }
        match self.rx.recv().await {
            Some(Item::Update(update)) => update,
            Some(Item::Finish) | None => {
                self.finished = true;
                self.rx.close();
                tracing::debug!("Update stream finished");
                Update::Finished
            }
        }
    }

    /// Whether the terminal marker has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
