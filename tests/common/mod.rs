//! Shared test fixtures and utilities for integration tests.
//!
//! # Deterministic completion order
//!
//! [`FakeBackend`] article fetches can be gated: the fetch future waits on a
//! `tokio::sync::watch` gate until the test calls [`FakeBackend::release`].
//! Tests run on the current-thread runtime and call [`settle`] to let the
//! request task process whatever has been released, so every interleaving is
//! chosen by the test rather than by the scheduler.
//!
//! # Shared Infrastructure
//!
//! [`TempWorkspace`] provides a temp directory for tests that read
//! configuration and dictionary files.

use dict_aggregator::backend::{ArticleFuture, MatchFuture, SearchFuture};
use dict_aggregator::folding::fold_case;
use dict_aggregator::{ArticleRequest, Backend, BackendError, DictionaryBackend, Features, WordMatch};
use futures::FutureExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

/// A temporary directory that is removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content, creating parent directories.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }

    /// Writes a small dictionary file with one entry per `(headword, article)`.
    pub fn create_dictionary(&self, path: &str, id: &str, entries: &[(&str, &str)]) -> PathBuf {
        let mut content = format!("id = \"{id}\"\nname = \"Dictionary {id}\"\n");
        for (headword, article) in entries {
            content.push_str(&format!(
                "\n[[entries]]\nheadword = \"{headword}\"\narticle = \"{article}\"\n"
            ));
        }
        self.create_file(path, &content)
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// What a [`FakeBackend`] answers to an article fetch.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum ArticleReply {
    Article(String),
    Missing,
    Error(String),
}

/// Arguments of the last article fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleCall {
    pub word: String,
    pub alternate_forms: Vec<String>,
    pub context: String,
    pub ignore_diacritics: bool,
}

/// Counts live article futures; decremented when a future is dropped,
/// whether it completed or not.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scriptable backend with call counters.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct FakeBackend {
    id: String,
    name: String,
    lang_from: Option<String>,
    compound_search: bool,
    reply: ArticleReply,
    reject_fetch: bool,
    gate: watch::Sender<bool>,
    synonyms: Result<Vec<String>, String>,
    stemmed: Vec<WordMatch>,
    prefixes: HashMap<String, Vec<WordMatch>>,
    last_article_call: Mutex<Option<ArticleCall>>,
    prefix_queries: Mutex<Vec<String>>,
    article_calls: AtomicUsize,
    synonym_calls: AtomicUsize,
    stemmed_calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl FakeBackend {
    /// An ungated backend with no article.
    pub fn new(id: &str) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            id: id.to_string(),
            name: format!("Dictionary {id}"),
            lang_from: None,
            compound_search: true,
            reply: ArticleReply::Missing,
            reject_fetch: false,
            gate,
            synonyms: Ok(Vec::new()),
            stemmed: Vec::new(),
            prefixes: HashMap::new(),
            last_article_call: Mutex::new(None),
            prefix_queries: Mutex::new(Vec::new()),
            article_calls: AtomicUsize::new(0),
            synonym_calls: AtomicUsize::new(0),
            stemmed_calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_article(mut self, body: &str) -> Self {
        self.reply = ArticleReply::Article(body.to_string());
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.reply = ArticleReply::Error(message.to_string());
        self
    }

    /// Fails every article fetch before it starts.
    pub fn rejecting_fetch(mut self) -> Self {
        self.reject_fetch = true;
        self
    }

    /// Article fetches wait for [`release`](Self::release).
    pub fn gated(self) -> Self {
        self.gate.send_replace(false);
        self
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.lang_from = Some(lang.to_string());
        self
    }

    pub fn with_synonyms(mut self, headwords: &[&str]) -> Self {
        self.synonyms = Ok(headwords.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn with_synonym_error(mut self, message: &str) -> Self {
        self.synonyms = Err(message.to_string());
        self
    }

    pub fn with_stemmed(mut self, words: &[&str]) -> Self {
        self.stemmed = words.iter().map(|w| WordMatch::new(*w)).collect();
        self
    }

    /// Answers a prefix query for `query` with `results`.
    pub fn with_prefix(mut self, query: &str, results: &[&str]) -> Self {
        self.prefixes
            .insert(fold_case(query), results.iter().map(|w| WordMatch::new(*w)).collect());
        self
    }

    pub fn without_compound_search(mut self) -> Self {
        self.compound_search = false;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lets gated article fetches complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn article_calls(&self) -> usize {
        self.article_calls.load(Ordering::SeqCst)
    }

    pub fn synonym_calls(&self) -> usize {
        self.synonym_calls.load(Ordering::SeqCst)
    }

    pub fn stemmed_calls(&self) -> usize {
        self.stemmed_calls.load(Ordering::SeqCst)
    }

    pub fn prefix_queries(&self) -> Vec<String> {
        self.prefix_queries.lock().unwrap().clone()
    }

    pub fn last_article_call(&self) -> Option<ArticleCall> {
        self.last_article_call.lock().unwrap().clone()
    }

    /// Article futures that exist and have not been dropped.
    pub fn fetches_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl DictionaryBackend for FakeBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lang_from(&self) -> Option<&str> {
        self.lang_from.as_deref()
    }

    fn features(&self) -> Features {
        Features {
            compound_search: self.compound_search,
        }
    }

    fn find_headwords_for_synonym(&self, _word: &str) -> SearchFuture {
        self.synonym_calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .synonyms
            .clone()
            .map_err(|message| BackendError::failed(self.id.clone(), message));
        futures::future::ready(answer).boxed()
    }

    fn get_article(
        &self,
        word: &str,
        alternate_forms: &[String],
        context: &str,
        ignore_diacritics: bool,
    ) -> Result<ArticleFuture, BackendError> {
        self.article_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_article_call.lock().unwrap() = Some(ArticleCall {
            word: word.to_string(),
            alternate_forms: alternate_forms.to_vec(),
            context: context.to_string(),
            ignore_diacritics,
        });

        if self.reject_fetch {
            return Err(BackendError::InvalidQuery(format!("rejected '{word}'")));
        }

        let mut gate = self.gate.subscribe();
        let reply = self.reply.clone();
        let backend = self.id.clone();
        let in_flight = InFlight::new(&self.in_flight);

        Ok(async move {
            let _in_flight = in_flight;
            let _ = gate.wait_for(|open| *open).await;
            match reply {
                ArticleReply::Article(body) => Ok(Some(body.into_bytes())),
                ArticleReply::Missing => Ok(None),
                ArticleReply::Error(message) => Err(BackendError::failed(backend, message)),
            }
        }
        .boxed())
    }

    fn stemmed_match(
        &self,
        _word: &str,
        _min_length: usize,
        _max_suffix_variation: usize,
        max_results: usize,
    ) -> MatchFuture {
        self.stemmed_calls.fetch_add(1, Ordering::SeqCst);
        let results = self.stemmed.iter().take(max_results).cloned().collect();
        futures::future::ready(Ok(results)).boxed()
    }

    fn prefix_match(&self, word: &str, max_results: usize) -> MatchFuture {
        self.prefix_queries.lock().unwrap().push(word.to_string());
        let results = self
            .prefixes
            .get(&fold_case(word))
            .map(|matches| matches.iter().take(max_results).cloned().collect())
            .unwrap_or_default();
        futures::future::ready(Ok(results)).boxed()
    }
}

/// Turns fakes into the backend list a request takes, keeping their order.
#[allow(dead_code)]
pub fn backends(fakes: &[&Arc<FakeBackend>]) -> Vec<Backend> {
    fakes.iter().map(|fake| Arc::clone(fake) as Backend).collect()
}

/// Lets the request task run until it blocks on something the test controls.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// The document written so far, as text.
#[allow(dead_code)]
pub fn document(request: &ArticleRequest) -> String {
    String::from_utf8(request.snapshot()).expect("document is UTF-8")
}

/// Byte offset of the article from `id`, if it was written.
#[allow(dead_code)]
pub fn article_position(document: &str, id: &str) -> Option<usize> {
    document.find(&format!("id=\"gdfrom-{id}\""))
}
