//! Keyword sets used to tell academic affiliations from industry ones.

use serde::{Deserialize, Serialize};

/// Institutional terms. Checked first: any hit makes an affiliation academic.
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "research center",
    "hospital",
    "academy",
    "school",
    "faculty",
    "department",
    "laboratory",
    "clinic",
    "medical center",
    "teaching hospital",
    "educational",
    "scholar",
    "postgraduate",
    "undergraduate",
    "phd",
    "professor",
    "lecturer",
    "researcher",
    "scientist",
    "academic",
    "higher education",
    "campus",
];

/// Commercial terms, consulted only when no academic keyword matched.
pub const NON_ACADEMIC_KEYWORDS: &[&str] = &[
    "pharmaceutical",
    "biotech",
    "company",
    "corporation",
    "inc.",
    "ltd.",
    "llc",
    "corp",
    "co.",
    "industry",
    "industries",
    "group",
    "solutions",
    "technologies",
    "enterprise",
    "business",
    "venture",
    "startup",
    "consulting",
    "consultancy",
    "firm",
    "agency",
    "development",
    "research and development",
    "r&d",
    "manufacturing",
    "production",
    "services",
    "healthcare",
    "medical devices",
    "clinical trials",
    "innovation",
    "venture capital",
    "private equity",
];

/// Two ordered, lowercase keyword lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub academic: Vec<String>,
    pub non_academic: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::new(ACADEMIC_KEYWORDS, NON_ACADEMIC_KEYWORDS)
    }
}

impl KeywordSets {
    /// Build keyword sets; entries are lowercased and blanks dropped.
    pub fn new<A, N>(academic: A, non_academic: N) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            academic: normalize(academic),
            non_academic: normalize(non_academic),
        }
    }

    /// Whether a lowercased affiliation contains an academic keyword
    pub fn is_academic(&self, lowered: &str) -> bool {
        self.academic.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// Whether a lowercased affiliation contains a non-academic keyword
    pub fn is_non_academic(&self, lowered: &str) -> bool {
        self.non_academic.iter().any(|k| lowered.contains(k.as_str()))
    }
}

fn normalize<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
