//! Cancelling a lookup stops backend work and freezes the document.

mod common;

use assert2::check;
use common::{FakeBackend, article_position, backends, document, settle};
use dict_aggregator::{ArticleRequest, LookupRequest, Outcome};
use std::sync::Arc;

fn four_gated() -> Vec<Arc<FakeBackend>> {
    ["a", "b", "c", "d"]
        .iter()
        .map(|id| FakeBackend::new(id).with_article(&format!("{id} body")).gated().shared())
        .collect()
}

#[tokio::test]
async fn test_cancel_with_pending_fetches() {
    let fakes = four_gated();
    let refs: Vec<_> = fakes.iter().collect();
    let request = ArticleRequest::start(LookupRequest::new("word", backends(&refs)));

    fakes[0].release();
    fakes[1].release();
    settle().await;
    check!(fakes[2].fetches_in_flight() == 1);
    check!(fakes[3].fetches_in_flight() == 1);

    request.cancel();
    check!(request.outcome() == Some(Outcome::Cancelled));
    settle().await;

    check!(fakes[2].fetches_in_flight() == 0);
    check!(fakes[3].fetches_in_flight() == 0);

    let frozen = document(&request);
    check!(article_position(&frozen, "a").is_some());
    check!(article_position(&frozen, "b").is_some());
    check!(article_position(&frozen, "c").is_none());
    check!(!frozen.ends_with("</body></html>"));

    fakes[2].release();
    fakes[3].release();
    settle().await;
    check!(document(&request) == frozen);
    check!(request.finished().await == Outcome::Cancelled);
}

#[tokio::test]
async fn test_cancel_before_the_task_runs() {
    let a = FakeBackend::new("a").with_article("alpha").shared();
    let request = ArticleRequest::start(LookupRequest::new("word", backends(&[&a])));
    let header = request.snapshot();

    request.cancel();
    settle().await;

    check!(a.article_calls() == 0);
    check!(a.synonym_calls() == 0);
    check!(request.snapshot() == header);
    check!(request.outcome() == Some(Outcome::Cancelled));
}

#[tokio::test]
async fn test_cancel_twice() {
    let a = FakeBackend::new("a").with_article("alpha").gated().shared();
    let request = ArticleRequest::start(LookupRequest::new("word", backends(&[&a])));
    settle().await;

    request.cancel();
    let len = request.len();
    request.cancel();
    settle().await;

    check!(request.len() == len);
    check!(request.outcome() == Some(Outcome::Cancelled));
}

#[tokio::test]
async fn test_cancel_after_finish_is_a_no_op() {
    let a = FakeBackend::new("a").with_article("alpha").shared();
    let request = ArticleRequest::start(LookupRequest::new("word", backends(&[&a])));
    check!(request.finished().await == Outcome::Finished);
    let doc = document(&request);

    request.cancel();

    check!(request.outcome() == Some(Outcome::Finished));
    check!(document(&request) == doc);
}

#[tokio::test]
async fn test_dropping_the_handle_abandons_backend_work() {
    let a = FakeBackend::new("a").with_article("alpha").gated().shared();
    let request = ArticleRequest::start(LookupRequest::new("word", backends(&[&a])));
    settle().await;
    check!(a.fetches_in_flight() == 1);

    drop(request);
    settle().await;

    check!(a.fetches_in_flight() == 0);
}

#[tokio::test]
async fn test_instant_request() {
    let request = ArticleRequest::instant("<p>ready</p>");
    check!(request.outcome() == Some(Outcome::Finished));
    check!(document(&request) == "<p>ready</p>");

    request.cancel();
    check!(request.finished().await == Outcome::Finished);
}
