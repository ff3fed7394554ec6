//! Fetches articles from every backend and merges them in backend order.

use super::LookupRequest;
use super::alternates::AlternateForms;
use super::buffer::ResultBuffer;
use crate::error::BackendError;
use crate::folding::normalize_word;
use crate::markup::plain::should_collapse;
use crate::markup::{ARTICLE_CLOSE, ARTICLE_SEPARATOR, ArticleHead, article_end};
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use std::collections::VecDeque;

type FetchResult = Result<Option<Vec<u8>>, BackendError>;
type Completion = BoxFuture<'static, (usize, FetchResult)>;

/// Where the document stands with respect to article wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleState {
    /// Nothing has been emitted; the next article needs no separator.
    NoArticlesYet,
    /// An article wrapper is open and must be closed before anything else.
    InsideArticle,
}

/// One in-flight fetch, queued in backend order.
#[derive(Debug)]
struct PendingFetch {
    backend: usize,
    result: Option<FetchResult>,
}

/// Orders concurrently completing article fetches into the document.
///
/// Only the front of the queue is ever written: a fetch that completes early
/// waits until every fetch queued before it has been written. The document is
/// therefore identical whatever order the backends answer in.
pub struct ArticleAggregator<'a> {
    request: &'a LookupRequest,
    buffer: &'a ResultBuffer,
    queue: VecDeque<PendingFetch>,
    in_flight: FuturesUnordered<Completion>,
    state: ArticleState,
    collapse_threshold: Option<usize>,
}

impl<'a> ArticleAggregator<'a> {
    /// Starts one fetch per backend.
    ///
    /// A backend that fails to start its fetch is logged and left out, as if it
    /// had no article.
    pub fn new(request: &'a LookupRequest, buffer: &'a ResultBuffer, alternates: &AlternateForms) -> Self {
        let word = normalize_word(&request.phrase.phrase);
        let alternates: Vec<String> = alternates.iter().cloned().collect();

        let mut queue = VecDeque::with_capacity(request.backends.len());
        let in_flight = FuturesUnordered::new();

        for (index, backend) in request.backends.iter().enumerate() {
            let context = request.contexts.get(backend.id()).map_or("", String::as_str);
            match backend.get_article(&word, &alternates, context, request.ignore_diacritics) {
                Ok(fetch) => {
                    queue.push_back(PendingFetch {
                        backend: index,
                        result: None,
                    });
                    in_flight.push(Box::pin(async move { (index, fetch.await) }) as Completion);
                }
                Err(e) => {
                    tracing::warn!(
                        "article request error ({}) in \"{}\"",
                        e,
                        backend.name()
                    );
                }
            }
        }

        // Collapsing only makes sense when there is something to scroll past.
        let collapse_threshold = if request.backends.len() > 1 {
            request.collapse_threshold
        } else {
            None
        };

        Self {
            request,
            buffer,
            queue,
            in_flight,
            state: ArticleState::NoArticlesYet,
            collapse_threshold,
        }
    }

    /// Writes every article in order as fetches complete, then closes the
    /// last article. Returns whether any article was written.
    pub async fn run(mut self) -> bool {
        while !self.queue.is_empty() {
            let Some((backend, result)) = self.in_flight.next().await else {
                break;
            };
            if let Some(slot) = self.queue.iter_mut().find(|slot| slot.backend == backend) {
                slot.result = Some(result);
            }
            self.write_ready();
        }

        match self.state {
            ArticleState::InsideArticle => {
                self.buffer.append(ARTICLE_CLOSE);
                true
            }
            ArticleState::NoArticlesYet => false,
        }
    }

    /// Writes completed fetches from the front of the queue, stopping at the
    /// first one still running.
    fn write_ready(&mut self) {
        while self.queue.front().is_some_and(|slot| slot.result.is_some()) {
            let Some(PendingFetch {
                backend,
                result: Some(result),
            }) = self.queue.pop_front()
            else {
                break;
            };
            self.write_article(backend, result);
        }
    }

    fn write_article(&mut self, index: usize, result: FetchResult) {
        let backend = &self.request.backends[index];

        let (body, error) = match result {
            Ok(None) => {
                tracing::debug!("no article in \"{}\"", backend.name());
                return;
            }
            Ok(Some(body)) => (Some(body), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let collapsed = body.as_deref().is_some_and(|body| {
            should_collapse(body, self.collapse_threshold, self.request.expand_optional_parts)
        });

        let head = ArticleHead {
            dictionary_id: backend.id(),
            dictionary_name: backend.name(),
            lang_from: backend.lang_from(),
            lang_to: backend.lang_to(),
            collapsed,
            error: error.as_deref(),
        }
        .render();
        let end = article_end(backend.id());

        let separator = match self.state {
            ArticleState::InsideArticle => ARTICLE_SEPARATOR,
            ArticleState::NoArticlesYet => "",
        };

        let body = body.unwrap_or_default();
        let mut chunk = Vec::with_capacity(separator.len() + head.len() + body.len() + end.len());
        chunk.extend_from_slice(separator.as_bytes());
        chunk.extend_from_slice(head.as_bytes());
        chunk.extend_from_slice(&body);
        chunk.extend_from_slice(end.as_bytes());

        self.buffer.append(chunk);
        self.state = ArticleState::InsideArticle;

        tracing::debug!(
            "article from \"{}\" written ({} bytes, collapsed: {})",
            backend.name(),
            body.len(),
            collapsed
        );
    }
}
