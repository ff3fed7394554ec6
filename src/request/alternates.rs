//! Collects alternate forms of the lookup word from every backend.

use crate::backend::{Backend, SearchFuture};
use crate::error::BackendError;
use crate::folding::normalize_word;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use std::collections::BTreeSet;

/// Alternate surface forms of the query, de-duplicated.
///
/// Kept ordered so that backends receive the same list on every run.
pub type AlternateForms = BTreeSet<String>;

type Completion = BoxFuture<'static, (usize, Result<Vec<String>, BackendError>)>;

/// Runs a "find headwords for synonym" search on every backend and merges the
/// answers.
pub struct AlternateFormsResolver<'a> {
    backends: &'a [Backend],
    forms: AlternateForms,
    pending: FuturesUnordered<Completion>,
}

impl<'a> AlternateFormsResolver<'a> {
    /// Starts one search per backend. `seed` forms are included in the result
    /// regardless of what the backends report.
    pub fn new(word: &str, backends: &'a [Backend], seed: impl IntoIterator<Item = String>) -> Self {
        let pending = backends
            .iter()
            .enumerate()
            .map(|(index, backend)| {
                let search: SearchFuture = backend.find_headwords_for_synonym(word);
                Box::pin(async move { (index, search.await) }) as Completion
            })
            .collect();

        Self {
            backends,
            forms: seed
                .into_iter()
                .map(|form| normalize_word(&form))
                .filter(|form| !form.is_empty())
                .collect(),
            pending,
        }
    }

    /// Waits for every search and returns the frozen set of forms.
    ///
    /// Searches that are already complete are merged on the first poll, so a
    /// set of instantaneous backends resolves without waiting. A failed search
    /// contributes nothing.
    pub async fn resolve(mut self) -> AlternateForms {
        while let Some((index, answer)) = self.pending.next().await {
            match answer {
                Ok(words) => {
                    self.forms.extend(
                        words
                            .iter()
                            .map(|word| normalize_word(word))
                            .filter(|word| !word.is_empty()),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "alternate form search failed in \"{}\": {}",
                        self.backends[index].name(),
                        e
                    );
                }
            }
        }

        tracing::debug!("alternate forms resolved: {:?}", self.forms);
        self.forms
    }
}
