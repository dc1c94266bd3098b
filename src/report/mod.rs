//! Flattening classified papers into report rows, and writing them out.

mod display;

pub use display::{render, OutputFormat};

use serde::Serialize;
use std::path::Path;

use crate::models::{ClassifiedPaper, UNKNOWN};

/// Errors raised while writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output was not valid UTF-8")]
    Utf8,
}

/// One output row in the standard column layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Publication Date")]
    pub publication_date: String,

    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,

    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,

    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl ReportRow {
    pub fn from_classified(paper: &ClassifiedPaper) -> Self {
        Self {
            pubmed_id: paper.paper.paper_id.clone(),
            title: paper.paper.title_or_unknown().to_string(),
            publication_date: paper.paper.year_or_unknown().to_string(),
            non_academic_authors: paper.non_academic_names().join(", "),
            company_affiliations: paper.companies().join(", "),
            corresponding_email: paper
                .paper
                .corresponding_email()
                .unwrap_or(UNKNOWN)
                .to_string(),
        }
    }
}

/// Wider row adding journal, DOI and the industry authors' own emails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedReportRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Journal")]
    pub journal: String,

    #[serde(rename = "Publication Date")]
    pub publication_date: String,

    #[serde(rename = "DOI")]
    pub doi: String,

    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,

    #[serde(rename = "Company Name(s)")]
    pub company_names: String,

    #[serde(rename = "Emails")]
    pub emails: String,
}

impl DetailedReportRow {
    pub fn from_classified(paper: &ClassifiedPaper) -> Self {
        let emails: Vec<&str> = paper
            .non_academic_authors
            .iter()
            .filter_map(|a| a.email.as_deref())
            .collect();

        Self {
            pubmed_id: paper.paper.paper_id.clone(),
            title: paper.paper.title_or_unknown().to_string(),
            journal: paper.paper.journal_or_unknown().to_string(),
            publication_date: paper.paper.year_or_unknown().to_string(),
            doi: paper.paper.doi_or_unknown().to_string(),
            non_academic_authors: paper.non_academic_names().join(", "),
            company_names: paper.companies().join(", "),
            emails: emails.join(", "),
        }
    }
}

/// Column layout for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLayout {
    #[default]
    Standard,
    Detailed,
}

pub fn standard_rows(papers: &[ClassifiedPaper]) -> Vec<ReportRow> {
    papers.iter().map(ReportRow::from_classified).collect()
}

pub fn detailed_rows(papers: &[ClassifiedPaper]) -> Vec<DetailedReportRow> {
    papers.iter().map(DetailedReportRow::from_classified).collect()
}

fn write_rows<W: std::io::Write, R: Serialize>(
    writer: W,
    rows: &[R],
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render papers as CSV text in the given layout
pub fn to_csv_string(papers: &[ClassifiedPaper], layout: ReportLayout) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    match layout {
        ReportLayout::Standard => write_rows(&mut buffer, &standard_rows(papers))?,
        ReportLayout::Detailed => write_rows(&mut buffer, &detailed_rows(papers))?,
    }
    String::from_utf8(buffer).map_err(|_| ReportError::Utf8)
}

/// Write papers to a CSV file in the given layout
pub fn write_csv(
    path: &Path,
    papers: &[ClassifiedPaper],
    layout: ReportLayout,
) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    match layout {
        ReportLayout::Standard => write_rows(file, &standard_rows(papers))?,
        ReportLayout::Detailed => write_rows(file, &detailed_rows(papers))?,
    }
    tracing::info!("Saved {} papers to {}", papers.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RecordFilter;
    use crate::models::{Author, PaperBuilder};

    fn sample() -> Vec<ClassifiedPaper> {
        let paper = PaperBuilder::new("38012345")
            .title("Deep learning, at scale")
            .publication_year("2023")
            .journal("Nature")
            .doi("10.1038/x")
            .author(Author::new(
                "Jane Doe",
                vec!["Department of Medicine, Stanford University. jd@stanford.edu".into()],
            ))
            .author(Author::new("Ann Lee", vec!["Pfizer Inc., New York".into()]))
            .author(Author::new(
                "Bo Chen",
                vec!["Roche Group, Basel. bo.chen@roche.com".into()],
            ))
            .build();

        RecordFilter::default().filter(vec![paper])
    }

    #[test]
    fn test_standard_row() {
        let rows = standard_rows(&sample());
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.pubmed_id, "38012345");
        assert_eq!(row.publication_date, "2023");
        assert_eq!(row.non_academic_authors, "Ann Lee, Bo Chen");
        assert_eq!(row.company_affiliations, "Pfizer Inc., Roche Group");
        // First email among all authors, academic ones included
        assert_eq!(row.corresponding_email, "jd@stanford.edu");
    }

    #[test]
    fn test_unknown_fields() {
        let paper = PaperBuilder::new("1")
            .author(Author::new("X", vec!["Acme Biotech, Boston".into()]))
            .build();
        let rows = standard_rows(&RecordFilter::default().filter(vec![paper]));

        assert_eq!(rows[0].title, UNKNOWN);
        assert_eq!(rows[0].publication_date, UNKNOWN);
        assert_eq!(rows[0].corresponding_email, UNKNOWN);
    }

    #[test]
    fn test_detailed_row_only_industry_emails() {
        let rows = detailed_rows(&sample());
        assert_eq!(rows[0].journal, "Nature");
        assert_eq!(rows[0].doi, "10.1038/x");
        assert_eq!(rows[0].emails, "bo.chen@roche.com");
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = to_csv_string(&sample(), ReportLayout::Standard).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding Author Email"
        );
        assert_eq!(
            lines.next().unwrap(),
            "38012345,\"Deep learning, at scale\",2023,\"Ann Lee, Bo Chen\",\"Pfizer Inc., Roche Group\",jd@stanford.edu"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &sample(), ReportLayout::Detailed).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "PubmedID,Title,Journal,Publication Date,DOI,Non-academic Author(s),Company Name(s),Emails"
        ));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_empty_csv_has_no_rows() {
        let csv = to_csv_string(&[], ReportLayout::Standard).unwrap();
        assert!(csv.is_empty());
    }
}
