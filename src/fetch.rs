//! Concurrent detail fetching with per-identifier retry.
//!
//! [`FetchOrchestrator::fetch_all`] spawns one task per identifier on a
//! [`JoinSet`], gated by a semaphore that lives only for the duration of the
//! call. Each task runs its own retry loop; a task that gives up yields
//! [`FetchOutcome::Failed`] and never affects its siblings. Results are written
//! back by input position, so completion order does not matter.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::Paper;
use crate::sources::Source;
use crate::utils::{with_retry_detailed, RetryConfig, RetryResult};

/// Result of fetching one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(Paper),
    Failed {
        id: String,
        /// Attempts made before giving up (0 if the task never ran)
        attempts: u32,
        error: String,
    },
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    pub fn paper(&self) -> Option<&Paper> {
        match self {
            FetchOutcome::Fetched(paper) => Some(paper),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn into_paper(self) -> Option<Paper> {
        match self {
            FetchOutcome::Fetched(paper) => Some(paper),
            FetchOutcome::Failed { .. } => None,
        }
    }
}

/// Drop failed slots, keeping fetched papers in input order
pub fn fetched_papers(outcomes: Vec<FetchOutcome>) -> Vec<Paper> {
    outcomes
        .into_iter()
        .filter_map(FetchOutcome::into_paper)
        .collect()
}

/// Default worker count: one per logical core, at least 1
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Drives concurrent `fetch_details` calls against a [`Source`]
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    source: Arc<dyn Source>,
    retry: RetryConfig,
    max_concurrency: usize,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            retry: RetryConfig::default(),
            max_concurrency: default_concurrency(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Maximum number of fetches in flight at once (at least 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Fetch every identifier; `result[i]` always corresponds to `ids[i]`
    pub async fn fetch_all(&self, ids: &[String]) -> Vec<FetchOutcome> {
        if ids.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, id) in ids.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let retry = self.retry;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let outcome = FetchOutcome::Failed {
                            id,
                            attempts: 0,
                            error: e.to_string(),
                        };
                        return (index, outcome);
                    }
                };
                let outcome = fetch_one(source.as_ref(), id, retry).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Fetch task did not complete: {}", e),
            }
        }

        let outcomes: Vec<FetchOutcome> = slots
            .into_iter()
            .zip(ids)
            .map(|(slot, id)| {
                slot.unwrap_or_else(|| FetchOutcome::Failed {
                    id: id.clone(),
                    attempts: 0,
                    error: "fetch task aborted".to_string(),
                })
            })
            .collect();

        let fetched = outcomes.iter().filter(|o| o.is_fetched()).count();
        tracing::info!("Fetched details for {} out of {} papers", fetched, ids.len());
        outcomes
    }
}

async fn fetch_one(source: &dyn Source, id: String, retry: RetryConfig) -> FetchOutcome {
    let result = with_retry_detailed(retry, || source.fetch_details(&id)).await;

    match result {
        RetryResult::Success(paper) => FetchOutcome::Fetched(paper),
        RetryResult::TransientFailure(error, _, attempts) => {
            tracing::warn!(
                "Failed to fetch details for ID {} after {} attempts: {}",
                id,
                attempts,
                error
            );
            FetchOutcome::Failed {
                id,
                attempts,
                error: error.to_string(),
            }
        }
        RetryResult::PermanentFailure(error) => {
            tracing::warn!("Failed to fetch details for ID {}: {}", id, error);
            FetchOutcome::Failed {
                id,
                attempts: 1,
                error: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchQuery, SearchResponse};
    use crate::sources::mock::make_paper;
    use crate::sources::{MockSource, SourceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let orchestrator = FetchOrchestrator::new(Arc::new(MockSource::new()));
        assert!(orchestrator.fetch_all(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_results_align_with_input() {
        let source = Arc::new(MockSource::new());
        for id in ["1", "2", "3", "4", "5"] {
            source.add_paper(make_paper(id, "Paper", &[]));
        }
        // Slow ids that need retries finish last
        source.add_flaky_paper(make_paper("1", "Paper", &[]), 2);
        source.add_flaky_paper(make_paper("3", "Paper", &[]), 1);
        source.set_fetch_delay(Duration::from_millis(2));

        let orchestrator = FetchOrchestrator::new(source.clone())
            .with_retry(fast_retry())
            .with_max_concurrency(3);
        let outcomes = orchestrator.fetch_all(&ids(&["1", "2", "3", "4", "5"])).await;

        let got: Vec<&str> = outcomes
            .iter()
            .map(|o| o.paper().map(|p| p.paper_id.as_str()).unwrap_or("-"))
            .collect();
        assert_eq!(got, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(source.fetch_calls("1"), 3);
        assert_eq!(source.fetch_calls("3"), 2);
    }

    #[tokio::test]
    async fn test_failures_are_absent_slots() {
        let source = Arc::new(MockSource::new());
        source.add_paper(make_paper("10", "A", &[]));
        source.fail_always("11");
        source.add_paper(make_paper("12", "C", &[]));
        source.fail_always("13");

        let orchestrator = FetchOrchestrator::new(source.clone()).with_retry(fast_retry());
        let outcomes = orchestrator.fetch_all(&ids(&["10", "11", "12", "13"])).await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_fetched());
        assert!(!outcomes[1].is_fetched());
        assert!(outcomes[2].is_fetched());
        assert!(!outcomes[3].is_fetched());

        match &outcomes[1] {
            FetchOutcome::Failed { id, attempts, .. } => {
                assert_eq!(id, "11");
                assert_eq!(*attempts, 3);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(source.fetch_calls("11"), 3);
        assert_eq!(source.fetch_calls("13"), 3);

        let papers = fetched_papers(outcomes);
        let kept: Vec<&str> = papers.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(kept, vec!["10", "12"]);
    }

    #[tokio::test]
    async fn test_flaky_beyond_budget_fails() {
        let source = Arc::new(MockSource::new());
        source.add_flaky_paper(make_paper("20", "Flaky", &[]), 3);

        let orchestrator = FetchOrchestrator::new(source.clone()).with_retry(fast_retry());
        let outcomes = orchestrator.fetch_all(&ids(&["20"])).await;

        assert!(!outcomes[0].is_fetched());
        assert_eq!(source.fetch_calls("20"), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let source = Arc::new(MockSource::new());
        source.fail_permanently("30", "malformed XML");

        let orchestrator = FetchOrchestrator::new(source.clone()).with_retry(fast_retry());
        let outcomes = orchestrator.fetch_all(&ids(&["30"])).await;

        assert!(matches!(
            &outcomes[0],
            FetchOutcome::Failed { attempts: 1, .. }
        ));
        assert_eq!(source.fetch_calls("30"), 1);
    }

    /// Records the highest number of overlapping `fetch_details` calls
    #[derive(Debug, Default)]
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Source for ConcurrencyProbe {
        fn id(&self) -> &str {
            "probe"
        }

        fn name(&self) -> &str {
            "Probe"
        }

        async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
            Ok(SearchResponse::new(Vec::new(), &query.query))
        }

        async fn fetch_details(&self, id: &str) -> Result<Paper, SourceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Paper::new(id))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let probe = Arc::new(ConcurrencyProbe::default());
        let orchestrator = FetchOrchestrator::new(probe.clone()).with_max_concurrency(2);

        let all: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        let outcomes = orchestrator.fetch_all(&all).await;

        assert_eq!(outcomes.len(), 8);
        assert!(outcomes.iter().all(FetchOutcome::is_fetched));
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_default_concurrency_follows_cores() {
        let expected = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(default_concurrency(), expected);
        assert!(default_concurrency() >= 1);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let orchestrator =
            FetchOrchestrator::new(Arc::new(MockSource::new())).with_max_concurrency(0);
        assert_eq!(orchestrator.max_concurrency(), 1);
    }
}
