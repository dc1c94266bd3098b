//! # PubMed Industry
//!
//! Finds PubMed papers that have at least one author affiliated with a
//! pharmaceutical or biotech company.
//!
//! ## Architecture
//!
//! - [`sources`]: Search and detail-fetch providers behind the [`Source`] trait
//! - [`fetch`]: Concurrent detail fetching with retry
//! - [`classify`]: Keyword-based affiliation classification and company extraction
//! - [`filter`]: Keeps papers with industry authors
//! - [`pipeline`]: Search, fetch and filter in one run
//! - [`report`]: CSV and console output
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client and retry helpers

pub mod classify;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use classify::AffiliationClassifier;
pub use fetch::{FetchOrchestrator, FetchOutcome};
pub use filter::RecordFilter;
pub use models::{ClassifiedPaper, Paper};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use sources::{PubMedSource, Source, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
