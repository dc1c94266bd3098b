//! Record filtering by author affiliation.
//!
//! Every author of every paper is run through the [`AffiliationClassifier`].
//! Only papers with at least one industry author whose company could be named
//! are kept.

use crate::classify::{AffiliationClassifier, Category};
use crate::models::{Author, ClassifiedPaper, NonAcademicAuthor, Paper};

/// Where a single author lands after looking at all of their affiliations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorPlacement {
    Academic,
    NonAcademic { company: String },
    Neither,
}

/// Splits paper authors into academic and industry lists
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    classifier: AffiliationClassifier,
}

impl RecordFilter {
    pub fn new(classifier: AffiliationClassifier) -> Self {
        Self { classifier }
    }

    /// Decide one author's placement
    ///
    /// Any academic affiliation makes the author academic. Otherwise the first
    /// non-academic affiliation with an extractable company decides.
    pub fn place_author(&self, author: &Author) -> AuthorPlacement {
        let mut company = None;

        for affiliation in &author.affiliations {
            let result = self.classifier.classify(affiliation);
            match result.category {
                Category::Academic => return AuthorPlacement::Academic,
                Category::NonAcademic if company.is_none() => company = result.company,
                _ => {}
            }
        }

        match company {
            Some(company) => AuthorPlacement::NonAcademic { company },
            None => AuthorPlacement::Neither,
        }
    }

    /// Classify every author of one paper
    pub fn classify_paper(&self, paper: Paper) -> ClassifiedPaper {
        let mut academic_authors = Vec::new();
        let mut non_academic_authors = Vec::new();

        for author in &paper.authors {
            match self.place_author(author) {
                AuthorPlacement::Academic => academic_authors.push(author.name.clone()),
                AuthorPlacement::NonAcademic { company } => {
                    tracing::debug!(
                        "Extracted company name: {} (Author: {})",
                        company,
                        author.name
                    );
                    non_academic_authors.push(NonAcademicAuthor {
                        name: author.name.clone(),
                        company,
                        email: author.email.clone(),
                    });
                }
                AuthorPlacement::Neither => {}
            }
        }

        ClassifiedPaper {
            paper,
            academic_authors,
            non_academic_authors,
        }
    }

    /// Keep only papers with at least one industry author, preserving order
    pub fn filter(&self, papers: Vec<Paper>) -> Vec<ClassifiedPaper> {
        let total = papers.len();
        let kept: Vec<ClassifiedPaper> = papers
            .into_iter()
            .map(|paper| self.classify_paper(paper))
            .filter(ClassifiedPaper::qualifies)
            .collect();

        tracing::info!(
            "Filtering complete: {} of {} papers have non-academic authors",
            kept.len(),
            total
        );
        kept
    }
}
