//! Metadata providers for bibliographic records.
//!
//! This module defines the [`Source`] trait: given a topic it returns a bounded
//! list of record identifiers, and given an identifier it returns the record's
//! bibliographic fields and authors. Network and XML concerns live entirely in
//! the implementations.
//!
//! - [`PubMedSource`]: NCBI E-utilities (`esearch` + `efetch`)
//! - [`MockSource`]: scripted in-memory provider for tests

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::PubMedSource;

use crate::models::{Paper, SearchQuery, SearchResponse};
use async_trait::async_trait;

/// The Source trait defines the interface for a metadata provider.
///
/// Implementations must be cheap to share behind an `Arc`: the fetch
/// orchestrator calls [`Source::fetch_details`] from many tasks at once.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for record identifiers matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError>;

    /// Fetch one record by identifier
    async fn fetch_details(&self, id: &str) -> Result<Paper, SourceError>;

    /// Validate that an identifier is correctly formatted for this source
    fn validate_id(&self, _id: &str) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Parsing error (XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Record not found
    #[error("Paper not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SourceError::Network(format!("request timed out: {}", err));
        }
        match err.status() {
            Some(status) if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                SourceError::RateLimit
            }
            Some(status) => SourceError::Status(status.as_u16()),
            None => SourceError::Network(err.to_string()),
        }
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
