//! In-memory dictionary backend loaded from a TOML file.
//!
//! Every operation answers immediately. The CLI uses it to serve small
//! hand-written dictionaries; tests use it as a realistic backend.

use crate::backend::{ArticleFuture, DictionaryBackend, Features, MatchFuture, SearchFuture, WordMatch};
use crate::error::{BackendError, LoadError};
use crate::folding::{fold, fold_case, normalize_word};
use ahash::{AHashMap, AHashSet};
use futures::FutureExt;
use futures::future::ready;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    id: String,
    name: String,
    lang_from: Option<String>,
    lang_to: Option<String>,
    #[serde(default = "default_compound_search")]
    compound_search: bool,
    #[serde(default)]
    entries: Vec<EntryFile>,
}

const fn default_compound_search() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    headword: String,
    article: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    headword: String,
    article: String,
}

/// Picks the Snowball algorithm for a two-letter language code.
fn stemmer_algorithm(lang: Option<&str>) -> Algorithm {
    match lang {
        Some("da") => Algorithm::Danish,
        Some("de") => Algorithm::German,
        Some("es") => Algorithm::Spanish,
        Some("fi") => Algorithm::Finnish,
        Some("fr") => Algorithm::French,
        Some("hu") => Algorithm::Hungarian,
        Some("it") => Algorithm::Italian,
        Some("nl") => Algorithm::Dutch,
        Some("no") => Algorithm::Norwegian,
        Some("pt") => Algorithm::Portuguese,
        Some("ro") => Algorithm::Romanian,
        Some("ru") => Algorithm::Russian,
        Some("sv") => Algorithm::Swedish,
        Some("tr") => Algorithm::Turkish,
        _ => Algorithm::English,
    }
}

/// A dictionary held entirely in memory.
pub struct MemoryDictionary {
    id: String,
    name: String,
    lang_from: Option<String>,
    lang_to: Option<String>,
    features: Features,
    entries: Vec<Entry>,
    /// Case-folded synonym → indices of the entries listing it.
    synonyms: AHashMap<String, Vec<usize>>,
    stemmer: Stemmer,
}

impl std::fmt::Debug for MemoryDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDictionary")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MemoryDictionary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang_from: None,
            lang_to: None,
            features: Features::default(),
            entries: Vec::new(),
            synonyms: AHashMap::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Sets the language pair; the source language also selects the stemmer.
    pub fn with_languages(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.lang_from = from.map(str::to_string);
        self.lang_to = to.map(str::to_string);
        self.stemmer = Stemmer::create(stemmer_algorithm(from));
        self
    }

    pub fn with_compound_search(mut self, enabled: bool) -> Self {
        self.features.compound_search = enabled;
        self
    }

    pub fn with_entry<S: AsRef<str>>(mut self, headword: &str, article: &str, synonyms: &[S]) -> Self {
        self.add_entry(headword, article, synonyms.iter().map(AsRef::as_ref));
        self
    }

    fn add_entry<'s>(&mut self, headword: &str, article: &str, synonyms: impl Iterator<Item = &'s str>) {
        let index = self.entries.len();
        self.entries.push(Entry {
            headword: normalize_word(headword),
            article: article.to_string(),
        });
        for synonym in synonyms {
            self.synonyms
                .entry(fold_case(&normalize_word(synonym)))
                .or_default()
                .push(index);
        }
    }

    /// Reads a dictionary file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Parses dictionary TOML; `path` is only used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, LoadError> {
        let file: DictionaryFile = toml::from_str(text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if file.id.trim().is_empty() {
            return Err(LoadError::Invalid {
                path: path.to_path_buf(),
                reason: "dictionary id is empty".to_string(),
            });
        }

        let mut dictionary = Self::new(file.id, file.name)
            .with_languages(file.lang_from.as_deref(), file.lang_to.as_deref())
            .with_compound_search(file.compound_search);

        for entry in &file.entries {
            if entry.headword.trim().is_empty() {
                return Err(LoadError::Invalid {
                    path: path.to_path_buf(),
                    reason: "entry with an empty headword".to_string(),
                });
            }
            dictionary.add_entry(
                &entry.headword,
                &entry.article,
                entry.synonyms.iter().map(String::as_str),
            );
        }

        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn headwords_for_synonym(&self, word: &str) -> Vec<String> {
        let mut seen = AHashSet::new();
        self.synonyms
            .get(&fold_case(&normalize_word(word)))
            .into_iter()
            .flatten()
            .map(|&index| self.entries[index].headword.clone())
            .filter(|headword| seen.insert(headword.clone()))
            .collect()
    }

    fn article(&self, word: &str, alternate_forms: &[String], ignore_diacritics: bool) -> Option<Vec<u8>> {
        let key = |text: &str| {
            if ignore_diacritics {
                fold(text)
            } else {
                fold_case(text)
            }
        };
        let wanted: AHashSet<String> = std::iter::once(word)
            .chain(alternate_forms.iter().map(String::as_str))
            .map(key)
            .collect();

        let articles: Vec<&str> = self
            .entries
            .iter()
            .filter(|entry| wanted.contains(&key(&entry.headword)))
            .map(|entry| entry.article.as_str())
            .collect();

        (!articles.is_empty()).then(|| articles.join("\n").into_bytes())
    }

    fn stemmed(&self, word: &str, min_length: usize, max_suffix_variation: usize, max_results: usize) -> Vec<WordMatch> {
        let query = fold_case(&normalize_word(word));
        let query_len = query.chars().count();
        if query_len < min_length {
            return Vec::new();
        }

        let stem = self.stemmer.stem(&query);
        let stem_len = stem.chars().count();
        let allowed_suffix = query_len.saturating_sub(stem_len) + max_suffix_variation;

        let mut seen = AHashSet::new();
        self.entries
            .iter()
            .filter(|entry| {
                let candidate = fold_case(&entry.headword);
                let candidate_len = candidate.chars().count();
                candidate_len >= min_length
                    && candidate_len.saturating_sub(stem_len) <= allowed_suffix
                    && self.stemmer.stem(&candidate) == stem
            })
            .filter(|entry| seen.insert(fold_case(&entry.headword)))
            .take(max_results)
            .map(|entry| WordMatch::new(entry.headword.clone()))
            .collect()
    }

    fn prefixed(&self, word: &str, max_results: usize) -> Vec<WordMatch> {
        let query = fold(&normalize_word(word));
        if query.is_empty() {
            return Vec::new();
        }

        let headwords = self.entries.iter().map(|entry| entry.headword.as_str());
        let synonyms = self.synonyms.keys().map(String::as_str);

        let mut seen = AHashSet::new();
        let mut matches: Vec<WordMatch> = headwords
            .chain(synonyms)
            .filter(|candidate| fold(candidate).starts_with(&query))
            .filter(|candidate| seen.insert(fold(candidate)))
            .map(WordMatch::new)
            .collect();
        // Synonym map iteration order is arbitrary.
        matches.sort_by(|a, b| {
            let by_len = a.word.chars().count().cmp(&b.word.chars().count());
            by_len.then_with(|| a.word.cmp(&b.word))
        });
        matches.truncate(max_results);
        matches
    }
}

impl DictionaryBackend for MemoryDictionary {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lang_from(&self) -> Option<&str> {
        self.lang_from.as_deref()
    }

    fn lang_to(&self) -> Option<&str> {
        self.lang_to.as_deref()
    }

    fn features(&self) -> Features {
        self.features
    }

    fn find_headwords_for_synonym(&self, word: &str) -> SearchFuture {
        ready(Ok(self.headwords_for_synonym(word))).boxed()
    }

    fn get_article(
        &self,
        word: &str,
        alternate_forms: &[String],
        _context: &str,
        ignore_diacritics: bool,
    ) -> Result<ArticleFuture, BackendError> {
        if word.trim().is_empty() {
            return Err(BackendError::InvalidQuery("empty word".to_string()));
        }
        Ok(ready(Ok(self.article(word, alternate_forms, ignore_diacritics))).boxed())
    }

    fn stemmed_match(
        &self,
        word: &str,
        min_length: usize,
        max_suffix_variation: usize,
        max_results: usize,
    ) -> MatchFuture {
        ready(Ok(self.stemmed(word, min_length, max_suffix_variation, max_results))).boxed()
    }

    fn prefix_match(&self, word: &str, max_results: usize) -> MatchFuture {
        ready(Ok(self.prefixed(word, max_results))).boxed()
    }
}
