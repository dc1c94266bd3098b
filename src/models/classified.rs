//! A paper augmented with the affiliation classification of its authors.

use serde::{Deserialize, Serialize};

use super::Paper;

/// An author judged to be industry-affiliated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonAcademicAuthor {
    pub name: String,

    /// Company segment extracted from the affiliation
    pub company: String,

    pub email: Option<String>,
}

/// A paper plus the academic / non-academic split of its authors
///
/// Produced once by [`crate::filter::RecordFilter`]; the wrapped paper is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPaper {
    #[serde(flatten)]
    pub paper: Paper,

    /// Names of authors with at least one academic affiliation
    pub academic_authors: Vec<String>,

    pub non_academic_authors: Vec<NonAcademicAuthor>,
}

impl ClassifiedPaper {
    /// Whether this paper belongs in the report
    pub fn qualifies(&self) -> bool {
        !self.non_academic_authors.is_empty()
    }

    /// Names of the non-academic authors in byline order
    pub fn non_academic_names(&self) -> Vec<&str> {
        self.non_academic_authors
            .iter()
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Company of each non-academic author, one entry per author
    pub fn companies(&self) -> Vec<&str> {
        self.non_academic_authors
            .iter()
            .map(|a| a.company.as_str())
            .filter(|c| *c != super::UNKNOWN)
            .collect()
    }
}
