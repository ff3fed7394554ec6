//! The dictionary backend capability consumed by the lookup pipeline.
//!
//! Backends perform the actual headword search and article retrieval. The
//! pipeline only ever talks to them through [`DictionaryBackend`]; every
//! operation returns a boxed future so that backends are free to do their own
//! I/O or threading. Dropping a returned future cancels the operation.

use crate::error::BackendError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Future returned by headword searches.
pub type SearchFuture = BoxFuture<'static, Result<Vec<String>, BackendError>>;

/// Future returned by approximate-match searches.
pub type MatchFuture = BoxFuture<'static, Result<Vec<WordMatch>, BackendError>>;

/// Future returned by article fetches. `Ok(None)` means the backend has no
/// article for the word, which is not an error.
pub type ArticleFuture = BoxFuture<'static, Result<Option<Vec<u8>>, BackendError>>;

/// Shared handle to a backend.
pub type Backend = Arc<dyn DictionaryBackend>;

/// Optional capabilities a backend advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// The backend's prefix search is suitable for recognizing multi-word
    /// expressions.
    pub compound_search: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            compound_search: true,
        }
    }
}

/// One candidate returned by an approximate match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatch {
    /// The candidate headword.
    pub word: String,
    /// Set when the backend offers this candidate as a spelling suggestion for
    /// the whole query, rather than as a mere prefix hit.
    pub suggestion: bool,
}

impl WordMatch {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            suggestion: false,
        }
    }

    pub fn suggestion(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            suggestion: true,
        }
    }
}

/// A dictionary data source.
pub trait DictionaryBackend: Send + Sync {
    /// Stable identifier, used in article element ids and context lookups.
    fn id(&self) -> &str;

    /// Human readable name shown in the article title bar.
    fn name(&self) -> &str;

    /// Two-letter source language code, if known.
    fn lang_from(&self) -> Option<&str> {
        None
    }

    /// Two-letter target language code, if known.
    fn lang_to(&self) -> Option<&str> {
        None
    }

    fn features(&self) -> Features {
        Features::default()
    }

    /// Finds the headwords for which `word` is a synonym or alternate form.
    fn find_headwords_for_synonym(&self, word: &str) -> SearchFuture;

    /// Starts fetching the article for `word`.
    ///
    /// The outer `Err` reports a failure to even start the fetch (malformed
    /// input and the like); the pipeline logs it and treats the backend as
    /// having no content.
    fn get_article(
        &self,
        word: &str,
        alternate_forms: &[String],
        context: &str,
        ignore_diacritics: bool,
    ) -> Result<ArticleFuture, BackendError>;

    /// Finds headwords sharing a stem with `word`.
    fn stemmed_match(
        &self,
        word: &str,
        min_length: usize,
        max_suffix_variation: usize,
        max_results: usize,
    ) -> MatchFuture;

    /// Finds headwords beginning with `word`.
    fn prefix_match(&self, word: &str, max_results: usize) -> MatchFuture;
}
