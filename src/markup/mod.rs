//! Fragments of the combined lookup document.
//!
//! The document is HTML understood by the article view: a header, one wrapper
//! per article, optional suggestion sections and a footer. Styling and
//! scripting live with the renderer; this module only emits the structure and
//! the class names the renderer keys on.

pub mod plain;

use std::fmt::Write as _;
use url::Url;

/// Base for in-document lookup links.
const LOOKUP_URL_BASE: &str = "gdlookup://localhost/";

/// Base for group icon images.
const FLAG_URL_BASE: &str = "qrc:///flags/";

/// Phrases at least this long are not echoed in the not-found notice.
const MAX_ECHOED_PHRASE_CHARS: usize = 40;

/// Closes the document body.
pub const DOCUMENT_FOOTER: &str = "</body></html>";

/// Closes the article wrapper and its body element.
pub const ARTICLE_CLOSE: &str = "</div></div>";

/// Emitted between two consecutive articles, after closing the previous one.
pub const ARTICLE_SEPARATOR: &str =
    "</div></div><div style=\"clear:both;\"></div><span class=\"gdarticleseparator\"></span>";

/// Escapes text for inclusion in element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escapes original inter-word spacing so it renders like the source phrase.
pub fn escape_spacing(spacing: &str) -> String {
    escape(spacing).replace('\n', "<br>")
}

/// Makes a link that looks `word` up.
///
/// The word becomes a single percent-encoded path segment, so `%` and `/`
/// survive the round trip.
pub fn link_word(word: &str) -> String {
    let href = Url::parse(LOOKUP_URL_BASE)
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut().ok()?.clear().push(word);
            Some(url.to_string())
        })
        .unwrap_or_else(|| format!("{LOOKUP_URL_BASE}{word}"));
    format!("<a href=\"{}\">{}</a>", escape(&href), escape(word))
}

/// Everything up to and including the opening body tag. A non-empty `icon`
/// names the group's flag image.
pub fn document_header(title: &str, icon: Option<&str>) -> String {
    let mut header = format!(
        "<!DOCTYPE html><html><head>\
         <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\
         <title>{}</title>",
        escape(title)
    );
    if let Some(icon) = icon.filter(|icon| !icon.is_empty()) {
        let _ = write!(
            header,
            "<link rel=\"icon\" type=\"image/png\" href=\"{FLAG_URL_BASE}{}\" />",
            escape(icon)
        );
    }
    header.push_str("</head><body>");
    header
}

/// The notice shown when no dictionary had an article for `word`.
pub fn not_found_body(word: &str, group: &str) -> String {
    let mut result = String::from("<div class=\"gdnotfound\"><p>");
    if word.is_empty() || word.chars().count() >= MAX_ECHOED_PHRASE_CHARS {
        let _ = write!(
            result,
            "No translation was found in group <b>{}</b>.",
            escape(group)
        );
    } else {
        let _ = write!(
            result,
            "No translation for <b>{}</b> was found in group <b>{}</b>.",
            escape(word),
            escape(group)
        );
    }
    result.push_str("</p></div>");
    result
}

/// Opening markup of one article.
#[derive(Debug, Clone)]
pub struct ArticleHead<'a> {
    pub dictionary_id: &'a str,
    pub dictionary_name: &'a str,
    pub lang_from: Option<&'a str>,
    pub lang_to: Option<&'a str>,
    pub collapsed: bool,
    /// Error reported by the backend in place of an article body.
    pub error: Option<&'a str>,
}

impl ArticleHead<'_> {
    pub fn render(&self) -> String {
        let id = escape(self.dictionary_id);
        let mut head = String::new();

        let _ = write!(
            head,
            "<div class=\"gdarticle{}\" id=\"gdfrom-{id}\">",
            if self.collapsed {
                " gdcollapsedarticle"
            } else {
                ""
            }
        );

        let _ = write!(
            head,
            "<div class=\"gddictname\" id=\"gddictname-{id}\"{}>\
             <span class=\"gdfromprefix\">From </span>\
             <span class=\"gddicttitle\">{}</span>\
             <span class=\"collapse_expand_area\"><span class=\"{}\" id=\"expandicon-{id}\" title=\"{}\"></span></span>\
             </div>",
            if self.collapsed {
                " title=\"Expand article\""
            } else {
                ""
            },
            escape(self.dictionary_name),
            if self.collapsed {
                "gdexpandicon"
            } else {
                "gdcollapseicon"
            },
            if self.collapsed {
                "Expand article"
            } else {
                "Collapse article"
            },
        );

        head.push_str("<div class=\"gddictnamebodyseparator\"></div>");

        let _ = write!(
            head,
            "<div class=\"gdarticlebody gdlangfrom-{}\" lang=\"{}\" style=\"display:{}\" id=\"gdarticlefrom-{id}\">",
            escape(self.lang_from.unwrap_or_default()),
            escape(self.lang_to.unwrap_or_default()),
            if self.collapsed { "none" } else { "inline" },
        );

        if let Some(error) = self.error {
            let _ = write!(
                head,
                "<div class=\"gderrordesc\">{}</div>",
                escape(&format!("Query error: {error}"))
            );
        }

        head
    }
}

/// Element id of the article wrapper for a dictionary.
pub fn article_element_id(dictionary_id: &str) -> String {
    format!("gdfrom-{}", escape(dictionary_id))
}

/// Marker emitted once an article's body has been written.
pub fn article_end(dictionary_id: &str) -> String {
    format!(
        "<script>gdArticleLoaded(\"{}\");</script>",
        article_element_id(dictionary_id)
    )
}

/// Opens a suggestion section with the given heading.
pub fn suggestion_section_open(heading: &str, right_to_left: bool) -> String {
    format!(
        "<div class=\"gdstemmedsuggestion\"><span class=\"gdstemmedsuggestion_head\">{}</span>\
         <span class=\"gdstemmedsuggestion_body\"{}>",
        escape(heading),
        if right_to_left { " dir=\"rtl\"" } else { "" }
    )
}

/// Closes a section opened with [`suggestion_section_open`].
pub const SUGGESTION_SECTION_CLOSE: &str = "</span></div>";

/// A complete "Close words" section, or nothing when there are no words.
pub fn close_words_section<S: AsRef<str>>(words: &[S]) -> String {
    if words.is_empty() {
        return String::new();
    }
    let links: Vec<String> = words.iter().map(|w| link_word(w.as_ref())).collect();
    format!(
        "{}{}{}",
        suggestion_section_open("Close words: ", false),
        links.join(", "),
        SUGGESTION_SECTION_CLOSE
    )
}
