//! A single lookup: from a phrase and a list of backends to one combined,
//! progressively growing document.
//!
//! [`ArticleRequest::start`] spawns one task per lookup. The task runs the
//! pipeline stages one after another:
//!
//! 1. [`AlternateFormsResolver`] collects alternate forms from every backend.
//! 2. [`ArticleAggregator`] fetches all articles concurrently and writes them in
//!    backend order.
//! 3. When no backend had an article, [`StemmedFallbackSearch`] appends
//!    suggestions, driving the [`CompoundWordMatcher`] for multi-word phrases.
//!
//! Backend completions are all polled from that one task, so the stages need
//! no locking of their own. Only the [`ResultBuffer`] is shared with readers.

pub mod aggregate;
pub mod alternates;
pub mod buffer;
pub mod compound;
pub mod fallback;

pub use aggregate::{ArticleAggregator, ArticleState};
pub use alternates::{AlternateForms, AlternateFormsResolver};
pub use buffer::{Outcome, Progress, ResultBuffer};
pub use compound::CompoundWordMatcher;
pub use fallback::StemmedFallbackSearch;

use crate::backend::Backend;
use crate::folding::normalize_word;
use crate::markup::{DOCUMENT_FOOTER, document_header, not_found_body};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};

/// The phrase being looked up, with any punctuation that trailed it in the
/// source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPhrase {
    pub phrase: String,
    pub punctuation_suffix: String,
}

impl InputPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            punctuation_suffix: String::new(),
        }
    }

    pub fn with_suffix(phrase: impl Into<String>, punctuation_suffix: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            punctuation_suffix: punctuation_suffix.into(),
        }
    }

    pub fn phrase_with_suffix(&self) -> String {
        format!("{}{}", self.phrase, self.punctuation_suffix)
    }
}

impl From<&str> for InputPhrase {
    fn from(phrase: &str) -> Self {
        Self::new(phrase)
    }
}

/// Everything a lookup needs, fixed when the lookup starts.
#[derive(Clone)]
pub struct LookupRequest {
    pub phrase: InputPhrase,
    /// Group name, shown in the not-found notice.
    pub group: String,
    /// Group icon, linked from the document header.
    pub icon: Option<String>,
    /// Free-text context per dictionary id, passed through to the backend.
    pub contexts: HashMap<String, String>,
    /// Backends in display order.
    pub backends: Vec<Backend>,
    /// Articles with more visible characters than this start collapsed.
    /// `None` disables collapsing.
    pub collapse_threshold: Option<usize>,
    /// Count optional article parts when measuring article size.
    pub expand_optional_parts: bool,
    pub ignore_diacritics: bool,
}

impl std::fmt::Debug for LookupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupRequest")
            .field("phrase", &self.phrase)
            .field("group", &self.group)
            .field("icon", &self.icon)
            .field("contexts", &self.contexts)
            .field(
                "backends",
                &self.backends.iter().map(|b| b.id()).collect::<Vec<_>>(),
            )
            .field("collapse_threshold", &self.collapse_threshold)
            .field("expand_optional_parts", &self.expand_optional_parts)
            .field("ignore_diacritics", &self.ignore_diacritics)
            .finish()
    }
}

impl LookupRequest {
    pub fn new(phrase: impl Into<InputPhrase>, backends: Vec<Backend>) -> Self {
        Self {
            phrase: phrase.into(),
            group: String::new(),
            icon: None,
            contexts: HashMap::new(),
            backends,
            collapse_threshold: None,
            expand_optional_parts: false,
            ignore_diacritics: false,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_contexts(mut self, contexts: HashMap<String, String>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_collapse_threshold(mut self, threshold: Option<usize>) -> Self {
        self.collapse_threshold = threshold;
        self
    }

    pub fn with_expand_optional_parts(mut self, expand: bool) -> Self {
        self.expand_optional_parts = expand;
        self
    }

    pub fn with_ignore_diacritics(mut self, ignore: bool) -> Self {
        self.ignore_diacritics = ignore;
        self
    }
}

/// Handle to a running (or finished) lookup.
///
/// The document can be read at any time with [`snapshot`](Self::snapshot);
/// [`subscribe`](Self::subscribe) delivers a notification after each append
/// and when the request ends. Dropping the handle abandons the backend work.
pub struct ArticleRequest {
    buffer: Arc<ResultBuffer>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl std::fmt::Debug for ArticleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleRequest")
            .field("len", &self.buffer.len())
            .field("outcome", &self.buffer.outcome())
            .finish()
    }
}

impl ArticleRequest {
    /// Starts the lookup on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn start(request: LookupRequest) -> Self {
        let header = document_header(&request.phrase.phrase, request.icon.as_deref());
        let buffer = Arc::new(ResultBuffer::with_contents(header.into_bytes()));
        let token = CancellationToken::new();

        tracing::debug!(
            "starting lookup of {:?} in {} dictionaries",
            request.phrase.phrase,
            request.backends.len()
        );

        let task = RequestTask {
            request,
            buffer: Arc::clone(&buffer),
        };
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {
                    tracing::debug!("lookup cancelled");
                }
                () = task.run() => {}
            }
        });

        Self {
            buffer,
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// A request that is already finished with the given document.
    pub fn instant(document: impl Into<Vec<u8>>) -> Self {
        let buffer = Arc::new(ResultBuffer::with_contents(document.into()));
        buffer.finish(Outcome::Finished);
        let token = CancellationToken::new();
        Self {
            buffer,
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// Cancels all outstanding backend work and ends the request without
    /// touching the document again. Does nothing if the request already ended.
    pub fn cancel(&self) {
        if self.buffer.finish(Outcome::Cancelled) {
            self.token.cancel();
        }
    }

    /// Copy of the document written so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.snapshot()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.buffer.outcome()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Receiver notified after each append and once the request ends.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.buffer.subscribe()
    }

    /// Waits until the request ends.
    pub async fn finished(&self) -> Outcome {
        let mut updates = self.subscribe();
        // The sender lives in the buffer we hold, so the channel cannot close.
        let outcome = match updates.wait_for(|progress| progress.outcome.is_some()).await {
            Ok(progress) => progress.outcome,
            Err(_) => self.buffer.outcome(),
        };
        outcome.unwrap_or(Outcome::Cancelled)
    }
}

/// The pipeline of one lookup, run on its own task.
struct RequestTask {
    request: LookupRequest,
    buffer: Arc<ResultBuffer>,
}

impl RequestTask {
    async fn run(self) {
        let request = &self.request;
        let word = normalize_word(&request.phrase.phrase);

        let seed = (!request.phrase.punctuation_suffix.is_empty())
            .then(|| request.phrase.phrase_with_suffix());
        let alternates = AlternateFormsResolver::new(&word, &request.backends, seed)
            .resolve()
            .await;

        let found = ArticleAggregator::new(request, &self.buffer, &alternates)
            .run()
            .await;

        if !found {
            tracing::debug!("no articles for {:?}, trying suggestions", word);
            self.buffer
                .append(not_found_body(&request.phrase.phrase, &request.group));
            StemmedFallbackSearch::new(request, &self.buffer).run().await;
        }

        self.buffer.append(DOCUMENT_FOOTER);
        self.buffer.finish(Outcome::Finished);
        tracing::debug!("lookup of {:?} finished", word);
    }
}
