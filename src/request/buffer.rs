//! The growing result document shared between the request task and readers.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pipeline ran to completion; the document is final.
    Finished,
    /// The request was cancelled; the document is whatever had been written.
    Cancelled,
}

/// Snapshot of the document state published after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Document length in bytes.
    pub len: usize,
    /// Set once the request has ended.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Default)]
struct Inner {
    data: Vec<u8>,
    outcome: Option<Outcome>,
}

/// Append-only byte buffer with a one-shot end marker.
///
/// Appends and snapshots are atomic with respect to each other, so a reader
/// always sees a prefix of the final document. Once an outcome is recorded the
/// buffer refuses further appends.
#[derive(Debug)]
pub struct ResultBuffer {
    inner: Mutex<Inner>,
    progress: watch::Sender<Progress>,
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::with_contents(Vec::new())
    }

    pub fn with_contents(data: Vec<u8>) -> Self {
        let (progress, _) = watch::channel(Progress {
            len: data.len(),
            outcome: None,
        });
        Self {
            inner: Mutex::new(Inner {
                data,
                outcome: None,
            }),
            progress,
        }
    }

    // The buffer only ever grows, so a panic mid-append cannot leave it in a
    // state worse than a shorter prefix.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `bytes` and notifies subscribers.
    ///
    /// Returns `false` without touching the document if the request already
    /// ended.
    pub fn append(&self, bytes: impl AsRef<[u8]>) -> bool {
        let bytes = bytes.as_ref();
        let mut inner = self.lock();
        if inner.outcome.is_some() {
            return false;
        }
        if bytes.is_empty() {
            return true;
        }
        inner.data.extend_from_slice(bytes);
        self.progress.send_replace(Progress {
            len: inner.data.len(),
            outcome: None,
        });
        true
    }

    /// Records the outcome. Only the first call has any effect; returns
    /// whether this call was it.
    pub fn finish(&self, outcome: Outcome) -> bool {
        let mut inner = self.lock();
        if inner.outcome.is_some() {
            return false;
        }
        inner.outcome = Some(outcome);
        self.progress.send_replace(Progress {
            len: inner.data.len(),
            outcome: Some(outcome),
        });
        true
    }

    /// Copy of the document so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.lock().outcome
    }

    /// Receiver for "document updated" and "finished" notifications.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }
}
