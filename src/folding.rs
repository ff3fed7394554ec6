//! Text folding and word splitting utilities shared by the matchers.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// A phrase split into words and the spacing around them.
///
/// `spacings` always holds one more element than `words`: the spacing before
/// the first word, between every pair of words, and after the last word.
/// Concatenating them alternately reproduces the input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitWords {
    pub words: Vec<String>,
    pub spacings: Vec<String>,
}

impl SplitWords {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lowercases using full Unicode case mapping.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Strips combining marks after canonical decomposition ("café" → "cafe").
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Case and diacritic insensitive form of `text`.
pub fn fold(text: &str) -> String {
    fold_diacritics(&fold_case(text))
}

/// Collapses every whitespace run into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                result.push(' ');
            }
            in_whitespace = true;
        } else {
            result.push(c);
            in_whitespace = false;
        }
    }
    result
}

/// Trims and collapses whitespace, the canonical form used for alternate forms.
pub fn normalize_word(text: &str) -> String {
    normalize_whitespace(text.trim())
}

/// Punctuation test covering ASCII, Latin-1, general and CJK punctuation.
pub fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}' | '\u{00B7}' | '\u{00BB}' | '\u{00BF}'
                | '\u{037E}' | '\u{0387}'
                | '\u{055A}'..='\u{055F}'
                | '\u{0589}' | '\u{05BE}' | '\u{05C0}' | '\u{05C3}' | '\u{05F3}' | '\u{05F4}'
                | '\u{060C}' | '\u{061B}' | '\u{061F}' | '\u{066A}'..='\u{066D}' | '\u{06D4}'
                | '\u{2010}'..='\u{2027}'
                | '\u{2030}'..='\u{205E}'
                | '\u{3001}'..='\u{3003}'
                | '\u{3008}'..='\u{3011}'
                | '\u{3014}'..='\u{301F}'
                | '\u{FF01}'..='\u{FF0F}'
                | '\u{FF1A}'..='\u{FF20}'
        )
}

/// Characters that separate words: whitespace and punctuation.
pub fn is_spacing(c: char) -> bool {
    c.is_whitespace() || is_punct(c)
}

/// Splits `input` into maximal runs of word characters and the spacing
/// between them.
pub fn split_into_words(input: &str) -> SplitWords {
    let mut result = SplitWords::default();
    let mut rest = input;

    loop {
        let spacing_end = rest.find(|c: char| !is_spacing(c)).unwrap_or(rest.len());
        result.spacings.push(rest[..spacing_end].to_string());
        rest = &rest[spacing_end..];

        let word_end = rest.find(is_spacing).unwrap_or(rest.len());
        if word_end == 0 {
            break;
        }
        result.words.push(rest[..word_end].to_string());
        rest = &rest[word_end..];
    }

    result
}

/// Whether the first strong character of `text` belongs to a right-to-left
/// script (Hebrew, Arabic, Syriac, Thaana, N'Ko and their presentation forms).
pub fn is_right_to_left(text: &str) -> bool {
    text.chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(|c| {
            matches!(
                c,
                '\u{0590}'..='\u{08FF}' | '\u{FB1D}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}'
            )
        })
}
