//! Big articles start collapsed when several dictionaries answer.

mod common;

use assert2::check;
use common::{FakeBackend, backends, document};
use dict_aggregator::{ArticleRequest, LookupRequest};
use rstest::rstest;

const LONG: &str = "a definition that is clearly longer than twenty characters";
const SHORT: &str = "tiny";

fn collapsed(doc: &str, id: &str) -> bool {
    doc.contains(&format!("class=\"gdarticle gdcollapsedarticle\" id=\"gdfrom-{id}\""))
}

fn expanded(doc: &str, id: &str) -> bool {
    doc.contains(&format!("class=\"gdarticle\" id=\"gdfrom-{id}\""))
}

async fn lookup(request: LookupRequest) -> String {
    let request = ArticleRequest::start(request);
    request.finished().await;
    document(&request)
}

#[tokio::test]
async fn test_only_big_articles_collapse() {
    let a = FakeBackend::new("a").with_article(LONG).shared();
    let b = FakeBackend::new("b").with_article(SHORT).shared();

    let doc = lookup(LookupRequest::new("word", backends(&[&a, &b])).with_collapse_threshold(Some(20))).await;

    check!(collapsed(&doc, "a"));
    check!(expanded(&doc, "b"));
    check!(doc.contains("style=\"display:none\" id=\"gdarticlefrom-a\""));
    check!(doc.contains("style=\"display:inline\" id=\"gdarticlefrom-b\""));
}

#[tokio::test]
async fn test_single_dictionary_never_collapses() {
    let a = FakeBackend::new("a").with_article(LONG).shared();

    let doc = lookup(LookupRequest::new("word", backends(&[&a])).with_collapse_threshold(Some(1))).await;

    check!(expanded(&doc, "a"));
}

#[tokio::test]
async fn test_disabled_threshold_never_collapses() {
    let a = FakeBackend::new("a").with_article(LONG).shared();
    let b = FakeBackend::new("b").with_article(LONG).shared();

    let doc = lookup(LookupRequest::new("word", backends(&[&a, &b])).with_collapse_threshold(None)).await;

    check!(expanded(&doc, "a"));
    check!(expanded(&doc, "b"));
}

#[rstest]
#[case::hidden_parts_not_counted(false, false)]
#[case::expanded_parts_counted(true, true)]
#[tokio::test]
async fn test_optional_parts(#[case] expand: bool, #[case] expect_collapsed: bool) {
    let body = format!("{SHORT}<div class=\"dsl_opt\"><div>{LONG}</div></div>");
    let a = FakeBackend::new("a").with_article(&body).shared();
    let b = FakeBackend::new("b").with_article(SHORT).shared();

    let doc = lookup(
        LookupRequest::new("word", backends(&[&a, &b]))
            .with_collapse_threshold(Some(20))
            .with_expand_optional_parts(expand),
    )
    .await;

    check!(collapsed(&doc, "a") == expect_collapsed);
    // The article body itself is never rewritten.
    check!(doc.contains(&body));
}
