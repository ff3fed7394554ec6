//! Suggestions shown when no backend had an article for the phrase.

use super::LookupRequest;
use super::buffer::ResultBuffer;
use super::compound::{CompoundWordMatcher, Next};
use crate::finder::{COMPOUND_MAX_RESULTS, MatchKind, STEMMED_MAX_RESULTS, WordFinder};
use crate::folding::split_into_words;
use crate::markup::close_words_section;

/// Stemmed whole-phrase search followed, for multi-word phrases, by the
/// compound expression search.
pub struct StemmedFallbackSearch<'a> {
    request: &'a LookupRequest,
    buffer: &'a ResultBuffer,
}

impl<'a> StemmedFallbackSearch<'a> {
    pub fn new(request: &'a LookupRequest, buffer: &'a ResultBuffer) -> Self {
        Self { request, buffer }
    }

    /// Appends the "close words" suggestions and, when the phrase has at least
    /// two words, the compound and individual word sections.
    pub async fn run(self) {
        let phrase = &self.request.phrase.phrase;

        let matches = WordFinder::approximate_match(
            phrase,
            &self.request.backends,
            STEMMED_MAX_RESULTS,
            MatchKind::Stemmed,
        )
        .await;
        tracing::debug!("stemmed search for {:?}: {} matches", phrase, matches.len());

        let words: Vec<&str> = matches.iter().map(|m| m.word.as_str()).collect();
        self.buffer.append(close_words_section(&words));

        let split = split_into_words(phrase);
        if split.len() < 2 {
            return;
        }

        self.run_compound(CompoundWordMatcher::from_split(split)).await;
    }

    async fn run_compound(&self, mut matcher: CompoundWordMatcher) {
        let mut step = matcher.begin();
        loop {
            self.buffer.append(&step.output);
            let Next::Search(candidate) = step.next else {
                break;
            };

            let results = WordFinder::approximate_match(
                &candidate,
                &self.request.backends,
                COMPOUND_MAX_RESULTS,
                MatchKind::Compound,
            )
            .await;
            let recognized = matcher.accept_results(&results);
            step = matcher.advance(recognized);
        }
    }
}
