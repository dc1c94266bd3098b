//! Paper model representing one PubMed record and its authors.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Placeholder rendered for any field the provider did not supply
pub const UNKNOWN: &str = "unknown";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("email pattern is a valid regex")
    })
}

/// Pull the first email-looking token out of a set of affiliation strings.
///
/// Only affiliations containing `@` are scanned. The result is a pattern match,
/// not a verified address.
pub fn extract_email<S: AsRef<str>>(affiliations: &[S]) -> Option<String> {
    affiliations
        .iter()
        .map(AsRef::as_ref)
        .filter(|aff| aff.contains('@'))
        .find_map(|aff| email_pattern().find(aff))
        .map(|m| m.as_str().to_string())
}

/// An author of a paper with their raw affiliation strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name ("ForeName LastName", or a collective name)
    pub name: String,

    /// Raw affiliation strings, in document order
    pub affiliations: Vec<String>,

    /// Email found in the affiliation text, if any
    pub email: Option<String>,
}

impl Author {
    /// Create an author, extracting the email from the affiliations
    pub fn new(name: impl Into<String>, affiliations: Vec<String>) -> Self {
        let email = extract_email(&affiliations);
        Self {
            name: name.into(),
            affiliations,
            email,
        }
    }
}

/// A bibliographic record fetched from the provider
///
/// Missing fields stay `None`; report code renders them as [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Provider identifier (PMID)
    pub paper_id: String,

    pub title: Option<String>,

    /// Publication year as printed by the provider
    pub publication_year: Option<String>,

    pub journal: Option<String>,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// Authors in byline order
    pub authors: Vec<Author>,
}

impl Paper {
    /// Create a paper with only its identifier set
    pub fn new(paper_id: impl Into<String>) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: None,
            publication_year: None,
            journal: None,
            doi: None,
            authors: Vec::new(),
        }
    }

    /// Title, or [`UNKNOWN`]
    pub fn title_or_unknown(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN)
    }

    /// Publication year, or [`UNKNOWN`]
    pub fn year_or_unknown(&self) -> &str {
        self.publication_year.as_deref().unwrap_or(UNKNOWN)
    }

    /// Journal title, or [`UNKNOWN`]
    pub fn journal_or_unknown(&self) -> &str {
        self.journal.as_deref().unwrap_or(UNKNOWN)
    }

    /// DOI, or [`UNKNOWN`]
    pub fn doi_or_unknown(&self) -> &str {
        self.doi.as_deref().unwrap_or(UNKNOWN)
    }

    /// First email found among all authors, in byline order
    pub fn corresponding_email(&self) -> Option<&str> {
        self.authors.iter().find_map(|a| a.email.as_deref())
    }

    /// Canonical PubMed page for this record
    pub fn url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.paper_id)
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    pub fn new(paper_id: impl Into<String>) -> Self {
        Self {
            paper: Paper::new(paper_id),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.paper.title = Some(title.into());
        self
    }

    pub fn publication_year(mut self, year: impl Into<String>) -> Self {
        self.paper.publication_year = Some(year.into());
        self
    }

    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.paper.journal = Some(journal.into());
        self
    }

    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Append one author
    pub fn author(mut self, author: Author) -> Self {
        self.paper.authors.push(author);
        self
    }

    /// Replace the author list
    pub fn authors(mut self, authors: Vec<Author>) -> Self {
        self.paper.authors = authors;
        self
    }

    pub fn build(self) -> Paper {
        self.paper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_builder() {
        let paper = PaperBuilder::new("31452104")
            .title("Test Paper")
            .publication_year("2021")
            .journal("Nature")
            .doi("10.1234/test.1234")
            .author(Author::new("Jane Doe", vec!["Pfizer Inc., New York".into()]))
            .build();

        assert_eq!(paper.paper_id, "31452104");
        assert_eq!(paper.title_or_unknown(), "Test Paper");
        assert_eq!(paper.doi, Some("10.1234/test.1234".to_string()));
        assert_eq!(paper.authors.len(), 1);
    }

    #[test]
    fn test_missing_fields_render_unknown() {
        let paper = Paper::new("1");
        assert_eq!(paper.title_or_unknown(), UNKNOWN);
        assert_eq!(paper.year_or_unknown(), UNKNOWN);
        assert_eq!(paper.journal_or_unknown(), UNKNOWN);
        assert_eq!(paper.doi_or_unknown(), UNKNOWN);
        assert_eq!(paper.corresponding_email(), None);
    }

    #[test]
    fn test_extract_email() {
        let affs = vec![
            "Genentech Inc., South San Francisco".to_string(),
            "Contact: j.doe@gene.com.".to_string(),
        ];
        assert_eq!(extract_email(&affs), Some("j.doe@gene.com".to_string()));

        let none: Vec<String> = vec!["University of Oslo".into()];
        assert_eq!(extract_email(&none), None);
    }

    #[test]
    fn test_author_new_extracts_email() {
        let author = Author::new(
            "John Smith",
            vec!["Acme Biotech Ltd., Cambridge, UK. john.smith@acme-bio.co.uk".into()],
        );
        assert_eq!(author.email.as_deref(), Some("john.smith@acme-bio.co.uk"));
    }

    #[test]
    fn test_corresponding_email_is_first_in_byline() {
        let paper = PaperBuilder::new("2")
            .author(Author::new("A", vec!["Somewhere".into()]))
            .author(Author::new("B", vec!["b@corp.com".into()]))
            .author(Author::new("C", vec!["c@corp.com".into()]))
            .build();
        assert_eq!(paper.corresponding_email(), Some("b@corp.com"));
    }
}
