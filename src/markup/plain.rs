//! Plain-text view of article markup, used to decide article collapsing.

use crate::folding::normalize_whitespace;
use regex::Regex;
use std::sync::LazyLock;

/// Opening tag of an optional (collapsible) article part.
const OPTIONAL_PART_OPEN: &str = "<div class=\"dsl_opt\"";

static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div[\s>]|</div\s*>").expect("valid div regex"));

static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("valid hidden block regex")
});

static BREAKING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br|/p|/div|/li|/tr|/h[1-6])\b[^>]*>").expect("valid breaking tag regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex"));

/// Finds the end (exclusive) of the div element whose opening tag starts at
/// `open`, honouring nested divs. Returns `None` for unbalanced markup.
fn find_end_of_div(html: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for tag in DIV_TAG.find_iter(&html[open..]) {
        if tag.as_str().starts_with("</") {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open + tag.end());
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Removes every optional part block.
///
/// Stops at the first unbalanced block and leaves the rest untouched.
pub fn strip_optional_parts(html: &str) -> String {
    let mut text = html.to_string();
    while let Some(start) = text.find(OPTIONAL_PART_OPEN) {
        let Some(end) = find_end_of_div(&text, start) else {
            break;
        };
        text.replace_range(start..end, "");
    }
    text
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// Converts markup to the text a reader would see.
pub fn to_plain_text(html: &str) -> String {
    let text = HIDDEN_BLOCK.replace_all(html, "");
    let text = BREAKING_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = ENTITY.replace_all(&text, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
    });

    text.lines()
        .map(|line| normalize_whitespace(line.trim()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of characters the article shows as plain text.
///
/// Optional parts are left out unless `expand_optional_parts` is set, since
/// they start hidden.
pub fn visible_text_len(article: &[u8], expand_optional_parts: bool) -> usize {
    let html = String::from_utf8_lossy(article);
    let html = if expand_optional_parts {
        html.into_owned()
    } else {
        strip_optional_parts(&html)
    };
    to_plain_text(&html).chars().count()
}

/// Whether an article should start collapsed under the given size threshold.
pub fn should_collapse(article: &[u8], threshold: Option<usize>, expand_optional_parts: bool) -> bool {
    threshold.is_some_and(|limit| visible_text_len(article, expand_optional_parts) > limit)
}
