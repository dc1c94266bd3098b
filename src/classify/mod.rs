//! Affiliation classification.
//!
//! An affiliation string is lowercased and checked against two keyword lists.
//! Academic keywords win over commercial ones, so "Pfizer Inc. and Harvard
//! University" is academic. For commercial affiliations the first comma-separated
//! segment that looks like a legal entity ("Inc.", "Ltd", "Pharmaceuticals", ...)
//! is taken as the company name.

mod keywords;

pub use keywords::{KeywordSets, ACADEMIC_KEYWORDS, NON_ACADEMIC_KEYWORDS};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Legal-entity patterns used to pick the company segment out of an affiliation
const COMPANY_PATTERNS: &[&str] = &[
    r"(?i)\b(?:inc\.?|ltd\.?|llc\.?|corp\.?|corporation|company|co\.?)\b",
    r"(?i)\b(?:pharmaceuticals?|biotech|industries|solutions|group)\b",
];

/// Outcome category for one affiliation string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Academic,
    NonAcademic,
    Unknown,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Category::Academic => "academic",
            Category::NonAcademic => "non-academic",
            Category::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Result of classifying one affiliation string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,

    /// Company segment, only ever set for [`Category::NonAcademic`]
    pub company: Option<String>,
}

impl Classification {
    fn academic() -> Self {
        Self {
            category: Category::Academic,
            company: None,
        }
    }

    fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            company: None,
        }
    }

    /// Non-academic with an extracted company name
    pub fn has_company(&self) -> bool {
        self.category == Category::NonAcademic && self.company.is_some()
    }
}

/// Keyword-driven affiliation classifier
///
/// Stateless once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    keywords: KeywordSets,
    company_patterns: Vec<Regex>,
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::new(KeywordSets::default())
    }
}

impl AffiliationClassifier {
    /// Create a classifier over the given keyword sets
    pub fn new(keywords: KeywordSets) -> Self {
        let company_patterns = COMPANY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("company patterns are valid regexes"))
            .collect();
        Self {
            keywords,
            company_patterns,
        }
    }

    /// Classify one affiliation string
    pub fn classify(&self, affiliation: &str) -> Classification {
        let lowered = affiliation.trim().to_lowercase();
        if lowered.is_empty() {
            return Classification::unknown();
        }

        if self.keywords.is_academic(&lowered) {
            return Classification::academic();
        }

        if self.keywords.is_non_academic(&lowered) {
            return Classification {
                category: Category::NonAcademic,
                company: self.extract_company(affiliation),
            };
        }

        Classification::unknown()
    }

    /// First comma-separated segment that matches a legal-entity pattern
    pub fn extract_company(&self, affiliation: &str) -> Option<String> {
        affiliation
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .find(|segment| self.company_patterns.iter().any(|re| re.is_match(segment)))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_affiliation() {
        let classifier = AffiliationClassifier::default();
        let result = classifier.classify("Stanford University, Dept. of Medicine");
        assert_eq!(result.category, Category::Academic);
        assert_eq!(result.company, None);
    }

    #[test]
    fn test_company_affiliation() {
        let classifier = AffiliationClassifier::default();
        let result = classifier.classify("Pfizer Inc., New York");
        assert_eq!(result.category, Category::NonAcademic);
        assert_eq!(result.company.as_deref(), Some("Pfizer Inc."));
        assert!(result.has_company());
    }

    #[test]
    fn test_unmatched_affiliation_is_unknown() {
        let classifier = AffiliationClassifier::default();
        let result = classifier.classify("Generic Research Org");
        assert_eq!(result.category, Category::Unknown);
        assert_eq!(result.company, None);
    }

    #[test]
    fn test_empty_affiliation_is_unknown() {
        let classifier = AffiliationClassifier::default();
        assert_eq!(classifier.classify("").category, Category::Unknown);
        assert_eq!(classifier.classify("   ").category, Category::Unknown);
    }

    #[test]
    fn test_academic_takes_precedence() {
        let classifier = AffiliationClassifier::default();
        let mixed = [
            "Novartis Pharmaceuticals and Harvard University, Boston",
            "Department of R&D, Roche Diagnostics Ltd., Basel",
            "Kaiser Permanente Healthcare Services Hospital",
        ];
        for affiliation in mixed {
            let result = classifier.classify(affiliation);
            assert_eq!(result.category, Category::Academic, "{}", affiliation);
            assert_eq!(result.company, None);
        }
    }

    #[test]
    fn test_non_academic_without_company_segment() {
        let classifier = AffiliationClassifier::default();
        // "consulting" is a commercial keyword but no segment looks like a legal entity
        let result = classifier.classify("Smith Consulting, Denver, USA");
        assert_eq!(result.category, Category::NonAcademic);
        assert_eq!(result.company, None);
        assert!(!result.has_company());
    }

    #[test]
    fn test_company_is_first_matching_segment() {
        let classifier = AffiliationClassifier::default();
        let result =
            classifier.classify("Oncology Unit, Genentech Biotech, South San Francisco, Acme Ltd.");
        assert_eq!(result.company.as_deref(), Some("Genentech Biotech"));
    }

    #[test]
    fn test_company_match_is_whole_word() {
        let classifier = AffiliationClassifier::default();
        // "Incyte" must not match "inc" as a whole word
        assert_eq!(classifier.extract_company("Incyte, Wilmington"), None);
        assert_eq!(
            classifier.extract_company("Incyte Corporation, Wilmington"),
            Some("Incyte Corporation".to_string())
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = AffiliationClassifier::default();
        for affiliation in [
            "Merck & Co., Inc., Rahway, NJ",
            "University of Tokyo",
            "Somewhere Else",
        ] {
            assert_eq!(classifier.classify(affiliation), classifier.classify(affiliation));
        }
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = AffiliationClassifier::new(KeywordSets::new(["campus"], ["labs"]));
        assert_eq!(
            classifier.classify("North Campus").category,
            Category::Academic
        );
        // Only custom keywords apply: "university" is no longer academic
        assert_eq!(
            classifier.classify("Some University").category,
            Category::Unknown
        );
        let result = classifier.classify("Bell Labs Group, Murray Hill");
        assert_eq!(result.category, Category::NonAcademic);
        assert_eq!(result.company.as_deref(), Some("Bell Labs Group"));
    }
}
