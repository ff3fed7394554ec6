//! Greedy longest-match search for multi-word expressions inside a phrase.
//!
//! The matcher is a synchronous state machine: the request task asks it for
//! the next candidate, runs the backend search, feeds the results back with
//! [`CompoundWordMatcher::accept_results`] and then calls
//! [`CompoundWordMatcher::advance`]. Every step hands back the markup to append.
//!
//! The window `[start..=end]` over the phrase's words starts at two words and
//! grows while backends keep recognizing it. When it cannot grow any further,
//! the longest window that matched exactly is emitted as a compound expression
//! and the window restarts one word to the right. After the last starting
//! position, links to all individual words conclude the output.

use crate::backend::WordMatch;
use crate::folding::{
    SplitWords, fold, is_right_to_left, normalize_whitespace, split_into_words,
};
use crate::markup::{
    SUGGESTION_SECTION_CLOSE, escape_spacing, link_word, suggestion_section_open,
};

/// What the driver should do after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Run a compound search for this candidate expression.
    Search(String),
    /// The matcher is finished.
    Done,
}

/// Output of one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Markup to append to the document (possibly empty).
    pub output: String,
    pub next: Next,
}

/// Finds the longest recognized multi-word expressions in a phrase, one
/// backend search per step, then lists the phrase's individual words.
#[derive(Debug, Clone)]
pub struct CompoundWordMatcher {
    split: SplitWords,
    /// Window start; `None` until the first window is opened.
    start: Option<usize>,
    /// Window end, inclusive.
    end: usize,
    candidate: String,
    /// Longest exact match found for the current window start.
    last_good: Option<String>,
    /// Whether the "compound expressions" section has been opened.
    section_open: bool,
    done: bool,
}

impl CompoundWordMatcher {
    pub fn new(phrase: &str) -> Self {
        Self::from_split(split_into_words(phrase))
    }

    pub fn from_split(split: SplitWords) -> Self {
        Self {
            split,
            start: None,
            end: 0,
            candidate: String::new(),
            last_good: None,
            section_open: false,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Opens the first window. Phrases of fewer than two words go straight
    /// to the individual words section.
    pub fn begin(&mut self) -> Step {
        self.advance(false)
    }

    /// Inspects the results of the search for [`Self::candidate`] and reports
    /// whether the window is worth growing.
    ///
    /// A spelling suggestion or a result that equals the candidate (ignoring
    /// case and diacritics) makes the candidate the current best compound. A
    /// result that merely starts with the candidate justifies growing but is
    /// not emitted on its own.
    pub fn accept_results(&mut self, results: &[WordMatch]) -> bool {
        let source = fold(&self.candidate);
        let mut recognized = false;

        for result in results {
            if result.suggestion {
                self.last_good = Some(self.candidate.clone());
                return true;
            }

            let folded = fold(&result.word);
            if folded.starts_with(&source) {
                recognized = true;
                if folded == source {
                    self.last_good = Some(self.candidate.clone());
                    break;
                }
            }
        }

        recognized
    }

    /// Moves to the next window.
    ///
    /// On success the window grows by one word if possible. An exact match
    /// does not stop growth: a longer window is still tried once, and a
    /// successful longer exact match replaces the shorter one. On failure, or
    /// when the window already reaches the last word, the best compound for
    /// this start is flushed and the window restarts one word to the right.
    pub fn advance(&mut self, last_succeeded: bool) -> Step {
        let mut output = String::new();
        if self.done {
            return Step {
                output,
                next: Next::Done,
            };
        }

        let word_count = self.split.len();

        if last_succeeded && self.end + 1 < word_count {
            self.end += 1;
            return self.search(output);
        }

        self.flush(&mut output);

        let next_start = self.start.map_or(0, |start| start + 1);
        if next_start + 1 >= word_count {
            if self.section_open {
                output.push_str(SUGGESTION_SECTION_CLOSE);
            }
            output.push_str(&self.individual_words());
            self.done = true;
            tracing::debug!("compound search finished after {} words", word_count);
            return Step {
                output,
                next: Next::Done,
            };
        }

        self.start = Some(next_start);
        self.end = next_start + 1;
        self.search(output)
    }

    fn search(&mut self, output: String) -> Step {
        self.candidate = self.compound();
        tracing::debug!("compound search window: {:?}", self.candidate);
        Step {
            output,
            next: Next::Search(self.candidate.clone()),
        }
    }

    fn flush(&mut self, output: &mut String) {
        let Some(good) = self.last_good.take() else {
            return;
        };
        if self.section_open {
            output.push_str(" / ");
        } else {
            output.push_str(&suggestion_section_open("Compound expressions: ", false));
            self.section_open = true;
        }
        output.push_str(&link_word(&good));
    }

    /// Words of the current window joined by their original spacing, with
    /// whitespace runs collapsed so line breaks do not leak into the query.
    fn compound(&self) -> String {
        let start = self.start.unwrap_or_default();
        let mut result = String::new();
        for index in start..=self.end {
            result.push_str(&self.split.words[index]);
            if index < self.end {
                result.push_str(&normalize_whitespace(&self.split.spacings[index + 1]));
            }
        }
        result
    }

    /// Links to every word, interleaved with the escaped original spacing.
    fn individual_words(&self) -> String {
        let SplitWords { words, spacings } = &self.split;
        let rtl = words.first().is_some_and(|word| is_right_to_left(word));

        let mut section = suggestion_section_open("Individual words: ", rtl);
        if let Some(leading) = spacings.first() {
            section.push_str(&escape_spacing(leading));
        }
        for (word, spacing) in words.iter().zip(spacings.iter().skip(1)) {
            section.push_str(&link_word(word));
            section.push_str(&escape_spacing(spacing));
        }
        section.push_str(SUGGESTION_SECTION_CLOSE);
        section
    }
}
