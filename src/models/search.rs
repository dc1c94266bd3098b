//! Search request and response models.

use serde::{Deserialize, Serialize};

/// Default number of identifiers requested from a search
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Topic / free-text search term
    pub query: String,

    /// Maximum number of identifiers to return
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// Identifiers returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Record identifiers, in provider ranking order
    pub ids: Vec<String>,

    /// Total hits reported by the provider, when known
    pub total_results: Option<usize>,

    /// The query that produced these results
    pub query: String,
}

impl SearchResponse {
    pub fn new(ids: Vec<String>, query: impl Into<String>) -> Self {
        Self {
            ids,
            total_results: None,
            query: query.into(),
        }
    }

    /// Set the provider-reported total
    pub fn total_results(mut self, total: usize) -> Self {
        self.total_results = Some(total);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new("cancer immunotherapy");
        assert_eq!(query.query, "cancer immunotherapy");
        assert_eq!(query.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("crispr").max_results(25);
        assert_eq!(query.max_results, 25);
    }
}
