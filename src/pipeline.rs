//! End-to-end run: search, fetch details, keep papers with industry authors.

use std::sync::Arc;

use crate::classify::AffiliationClassifier;
use crate::config::Config;
use crate::fetch::{fetched_papers, FetchOrchestrator};
use crate::filter::RecordFilter;
use crate::models::{ClassifiedPaper, SearchQuery};
use crate::sources::Source;

pub const NO_PAPERS_FOUND: &str = "No papers found. Exiting.";
pub const NO_RELEVANT_PAPERS: &str = "No relevant papers found after filtering.";

/// Counts collected along one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifiers returned by the search
    pub found: usize,
    pub fetched: usize,
    pub failed: usize,
    /// Papers with at least one industry author
    pub qualifying: usize,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Search returned nothing; no fetches were made
    NoPapersFound,
    /// Papers were fetched but none had an industry author
    NoQualifyingPapers(RunSummary),
    Report {
        papers: Vec<ClassifiedPaper>,
        summary: RunSummary,
    },
}

impl PipelineOutcome {
    /// Qualifying papers, empty for the early-exit outcomes
    pub fn papers(&self) -> &[ClassifiedPaper] {
        match self {
            PipelineOutcome::Report { papers, .. } => papers,
            _ => &[],
        }
    }

    /// Console message for the early-exit outcomes
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PipelineOutcome::NoPapersFound => Some(NO_PAPERS_FOUND),
            PipelineOutcome::NoQualifyingPapers(_) => Some(NO_RELEVANT_PAPERS),
            PipelineOutcome::Report { .. } => None,
        }
    }
}

/// Search, fetch and filter against one [`Source`]
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: Arc<dyn Source>,
    orchestrator: FetchOrchestrator,
    filter: RecordFilter,
}

impl Pipeline {
    /// Pipeline with default retry, concurrency and keywords
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(Arc::clone(&source)),
            source,
            filter: RecordFilter::default(),
        }
    }

    pub fn from_config(source: Arc<dyn Source>, config: &Config) -> Self {
        let orchestrator = FetchOrchestrator::new(Arc::clone(&source))
            .with_retry(config.fetch.retry_config())
            .with_max_concurrency(config.fetch.max_concurrent_requests);
        let classifier = AffiliationClassifier::new(config.classifier.keyword_sets());

        Self {
            source,
            orchestrator,
            filter: RecordFilter::new(classifier),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: FetchOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    /// Run the query end to end
    ///
    /// A failed search is logged and treated as an empty result.
    pub async fn run(&self, query: &SearchQuery) -> PipelineOutcome {
        let ids = match self.source.search(query).await {
            Ok(response) => response.ids,
            Err(e) => {
                tracing::warn!("Search failed on {}: {}", self.source.name(), e);
                Vec::new()
            }
        };

        if ids.is_empty() {
            return PipelineOutcome::NoPapersFound;
        }
        tracing::info!("Found {} papers for query: {}", ids.len(), query.query);

        let outcomes = self.orchestrator.fetch_all(&ids).await;
        let fetched = outcomes.iter().filter(|o| o.is_fetched()).count();
        let kept = self.filter.filter(fetched_papers(outcomes));
        let summary = RunSummary {
            found: ids.len(),
            fetched,
            failed: ids.len() - fetched,
            qualifying: kept.len(),
        };

        if kept.is_empty() {
            PipelineOutcome::NoQualifyingPapers(summary)
        } else {
            PipelineOutcome::Report {
                papers: kept,
                summary,
            }
        }
    }
}
