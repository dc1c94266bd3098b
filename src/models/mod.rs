//! Core data models for papers, searches, and classification results.

mod classified;
mod paper;
mod search;

pub use classified::{ClassifiedPaper, NonAcademicAuthor};
pub use paper::{extract_email, Author, Paper, PaperBuilder, UNKNOWN};
pub use search::{SearchQuery, SearchResponse, DEFAULT_MAX_RESULTS};
