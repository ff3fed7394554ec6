//! Approximate matching across several backends.

use crate::backend::{Backend, MatchFuture, WordMatch};
use crate::folding::fold;
use ahash::AHashMap;
use futures::future::join_all;

/// Shortest word the stemmed search considers.
pub const STEMMED_MIN_LENGTH: usize = 3;

/// How many characters a stemmed candidate may differ in beyond the stem.
pub const STEMMED_MAX_SUFFIX_VARIATION: usize = 1;

/// Result cap for the whole-phrase stemmed fallback.
pub const STEMMED_MAX_RESULTS: usize = 30;

/// Result cap for compound expression probes.
pub const COMPOUND_MAX_RESULTS: usize = 40;

/// Which kind of approximate match to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Whole-phrase stemmed matching, queried on every backend.
    Stemmed,
    /// Prefix matching for multi-word expressions, queried only on backends
    /// that support compound searching.
    Compound,
}

/// Fans approximate-match queries out to backends and merges the answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordFinder;

impl WordFinder {
    /// Runs one approximate match of `phrase` over `backends`.
    ///
    /// Results keep backend order, are de-duplicated on their folded form
    /// (suggestion flags are merged), put exact folded matches first and are
    /// capped at `max_results`. A failing backend contributes nothing.
    pub async fn approximate_match(
        phrase: &str,
        backends: &[Backend],
        max_results: usize,
        kind: MatchKind,
    ) -> Vec<WordMatch> {
        let queries: Vec<(&Backend, MatchFuture)> = backends
            .iter()
            .filter(|backend| kind == MatchKind::Stemmed || backend.features().compound_search)
            .map(|backend| {
                let future = match kind {
                    MatchKind::Stemmed => backend.stemmed_match(
                        phrase,
                        STEMMED_MIN_LENGTH,
                        STEMMED_MAX_SUFFIX_VARIATION,
                        max_results,
                    ),
                    MatchKind::Compound => backend.prefix_match(phrase, max_results),
                };
                (backend, future)
            })
            .collect();

        let (sources, pending): (Vec<_>, Vec<_>) = queries.into_iter().unzip();
        let answers = join_all(pending).await;

        let mut per_backend = Vec::with_capacity(answers.len());
        for (backend, answer) in sources.into_iter().zip(answers) {
            match answer {
                Ok(matches) => per_backend.push(matches),
                Err(e) => {
                    tracing::warn!(
                        "{:?} match for {:?} failed in \"{}\": {}",
                        kind,
                        phrase,
                        backend.name(),
                        e
                    );
                }
            }
        }

        merge_matches(phrase, per_backend, max_results)
    }
}

/// Merges per-backend answers; see [`WordFinder::approximate_match`].
pub fn merge_matches(
    phrase: &str,
    per_backend: Vec<Vec<WordMatch>>,
    max_results: usize,
) -> Vec<WordMatch> {
    let mut merged: Vec<WordMatch> = Vec::new();
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for candidate in per_backend.into_iter().flatten() {
        let key = fold(&candidate.word);
        match positions.get(&key) {
            Some(&index) => merged[index].suggestion |= candidate.suggestion,
            None => {
                positions.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    let target = fold(phrase);
    merged.sort_by_key(|candidate| fold(&candidate.word) != target);
    merged.truncate(max_results);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn words(matches: &[WordMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.word.as_str()).collect()
    }

    #[test]
    fn test_merge_keeps_backend_order_and_dedups() {
        let merged = merge_matches(
            "run",
            vec![
                vec![WordMatch::new("runner"), WordMatch::new("Run")],
                vec![WordMatch::suggestion("run"), WordMatch::new("runs")],
            ],
            10,
        );
        check!(words(&merged) == ["Run", "runner", "runs"]);
        check!(merged[0].suggestion);
        check!(!merged[1].suggestion);
    }

    #[test]
    fn test_merge_folds_diacritics() {
        let merged = merge_matches(
            "cafe",
            vec![vec![WordMatch::new("cafeteria"), WordMatch::new("café")], vec![WordMatch::new("Cafe")]],
            10,
        );
        check!(words(&merged) == ["café", "cafeteria"]);
    }

    #[test]
    fn test_merge_truncates() {
        let merged = merge_matches(
            "x",
            vec![vec![WordMatch::new("xa"), WordMatch::new("xb"), WordMatch::new("xc")]],
            2,
        );
        check!(words(&merged) == ["xa", "xb"]);
    }
}
