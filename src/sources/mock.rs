//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{Author, Paper, PaperBuilder, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceError};

/// How the mock answers `fetch_details` for one identifier
#[derive(Debug, Clone)]
enum FetchScript {
    /// Fail transiently this many times, then return the paper
    Flaky { failures: usize, paper: Paper },
    /// Fail transiently on every call
    AlwaysFail,
    /// Fail once with a non-retryable error
    Permanent(String),
}

/// A mock source for testing that returns predefined responses.
///
/// Identifiers without a script resolve to [`SourceError::NotFound`].
#[derive(Debug, Default)]
pub struct MockSource {
    search_ids: Mutex<Vec<String>>,
    scripts: Mutex<HashMap<String, FetchScript>>,
    calls: Mutex<HashMap<String, usize>>,
    search_calls: AtomicUsize,
    search_error: Mutex<Option<String>>,
    fetch_delay: Mutex<Option<Duration>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifiers returned by `search`.
    pub fn set_search_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.search_ids.lock().unwrap();
        *guard = ids.into_iter().map(Into::into).collect();
    }

    /// Make `search` fail with an API error.
    pub fn fail_search(&self, message: impl Into<String>) {
        let mut guard = self.search_error.lock().unwrap();
        *guard = Some(message.into());
    }

    /// Serve this paper for its own identifier.
    pub fn add_paper(&self, paper: Paper) {
        self.add_flaky_paper(paper, 0);
    }

    /// Serve this paper after `failures` transient errors.
    pub fn add_flaky_paper(&self, paper: Paper, failures: usize) {
        let mut guard = self.scripts.lock().unwrap();
        guard.insert(paper.paper_id.clone(), FetchScript::Flaky { failures, paper });
    }

    /// Make every fetch of `id` fail with a network error.
    pub fn fail_always(&self, id: impl Into<String>) {
        let mut guard = self.scripts.lock().unwrap();
        guard.insert(id.into(), FetchScript::AlwaysFail);
    }

    /// Make fetching `id` fail with a non-retryable parse error.
    pub fn fail_permanently(&self, id: impl Into<String>, message: impl Into<String>) {
        let mut guard = self.scripts.lock().unwrap();
        guard.insert(id.into(), FetchScript::Permanent(message.into()));
    }

    /// Sleep before answering each fetch, to shuffle completion order.
    pub fn set_fetch_delay(&self, delay: Duration) {
        let mut guard = self.fetch_delay.lock().unwrap();
        *guard = Some(delay);
    }

    /// Number of `fetch_details` calls made for `id`.
    pub fn fetch_calls(&self, id: &str) -> usize {
        let guard = self.calls.lock().unwrap();
        guard.get(id).copied().unwrap_or(0)
    }

    /// Total `fetch_details` calls across all identifiers.
    pub fn total_fetch_calls(&self) -> usize {
        let guard = self.calls.lock().unwrap();
        guard.values().sum()
    }

    /// Number of `search` calls.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.search_error.lock().unwrap().clone() {
            return Err(SourceError::Api(message));
        }
        let guard = self.search_ids.lock().unwrap();
        let ids: Vec<String> = guard.iter().take(query.max_results).cloned().collect();
        let total = guard.len();
        Ok(SearchResponse::new(ids, &query.query).total_results(total))
    }

    async fn fetch_details(&self, id: &str) -> Result<Paper, SourceError> {
        let call_number = {
            let mut guard = self.calls.lock().unwrap();
            let count = guard.entry(id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let script = {
            let guard = self.scripts.lock().unwrap();
            guard.get(id).cloned()
        };

        match script {
            Some(FetchScript::Flaky { failures, paper }) if call_number > failures => Ok(paper),
            Some(FetchScript::Flaky { .. }) | Some(FetchScript::AlwaysFail) => Err(
                SourceError::Network(format!("mock connection reset for {}", id)),
            ),
            Some(FetchScript::Permanent(message)) => Err(SourceError::Parse(message)),
            None => Err(SourceError::NotFound(id.to_string())),
        }
    }
}

/// Helper function to create a mock paper with one author per affiliation.
pub fn make_paper(paper_id: &str, title: &str, authors: &[(&str, &str)]) -> Paper {
    PaperBuilder::new(paper_id)
        .title(title)
        .publication_year("2024")
        .authors(
            authors
                .iter()
                .map(|(name, affiliation)| {
                    let affiliations = if affiliation.is_empty() {
                        Vec::new()
                    } else {
                        vec![affiliation.to_string()]
                    };
                    Author::new(*name, affiliations)
                })
                .collect(),
        )
        .build()
}
