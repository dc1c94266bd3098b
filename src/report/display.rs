//! Console rendering of report rows.

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

use super::{detailed_rows, standard_rows, ReportError, ReportLayout};
use crate::models::ClassifiedPaper;

/// Output format for console results
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Table on a terminal, JSON otherwise
    #[default]
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    /// Replace `Auto` with a concrete format
    pub fn resolve(self, is_terminal: bool) -> Self {
        match self {
            OutputFormat::Auto if is_terminal => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

const TITLE_WIDTH: usize = 50;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Render classified papers for the console
pub fn render(
    papers: &[ClassifiedPaper],
    format: OutputFormat,
    layout: ReportLayout,
) -> Result<String, ReportError> {
    match (format, layout) {
        (OutputFormat::Json, ReportLayout::Standard) => {
            Ok(serde_json::to_string_pretty(&standard_rows(papers))?)
        }
        (OutputFormat::Json, ReportLayout::Detailed) => {
            Ok(serde_json::to_string_pretty(&detailed_rows(papers))?)
        }
        (OutputFormat::Plain, _) => Ok(render_plain(papers, layout)),
        // Auto is resolved by the caller; fall back to a table
        (OutputFormat::Table | OutputFormat::Auto, _) => Ok(render_table(papers, layout)),
    }
}

fn render_plain(papers: &[ClassifiedPaper], layout: ReportLayout) -> String {
    let mut out = String::new();
    for row in standard_rows(papers) {
        out.push_str(&format!(
            "{} - {} ({})\n",
            row.pubmed_id, row.title, row.publication_date
        ));
        out.push_str(&format!("  Authors: {}\n", row.non_academic_authors));
        out.push_str(&format!("  Companies: {}\n", row.company_affiliations));
        out.push_str(&format!("  Email: {}\n", row.corresponding_email));
        if layout == ReportLayout::Detailed {
            if let Some(paper) = papers.iter().find(|p| p.paper.paper_id == row.pubmed_id) {
                out.push_str(&format!("  Journal: {}\n", paper.paper.journal_or_unknown()));
                out.push_str(&format!("  DOI: {}\n", paper.paper.doi_or_unknown()));
                out.push_str(&format!("  URL: {}\n", paper.paper.url()));
            }
        }
        out.push('\n');
    }
    out
}

fn render_table(papers: &[ClassifiedPaper], layout: ReportLayout) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    match layout {
        ReportLayout::Standard => {
            table.set_header(vec![
                "PubmedID",
                "Title",
                "Year",
                "Non-academic Author(s)",
                "Company Affiliation(s)",
                "Email",
            ]);
            for row in standard_rows(papers) {
                table.add_row(vec![
                    Cell::new(row.pubmed_id),
                    Cell::new(truncate(&row.title, TITLE_WIDTH)).add_attribute(Attribute::Bold),
                    Cell::new(row.publication_date),
                    Cell::new(row.non_academic_authors),
                    Cell::new(row.company_affiliations),
                    Cell::new(row.corresponding_email),
                ]);
            }
        }
        ReportLayout::Detailed => {
            table.set_header(vec![
                "PubmedID",
                "Title",
                "Journal",
                "Year",
                "DOI",
                "Non-academic Author(s)",
                "Company Name(s)",
                "Emails",
            ]);
            for row in detailed_rows(papers) {
                table.add_row(vec![
                    Cell::new(row.pubmed_id),
                    Cell::new(truncate(&row.title, TITLE_WIDTH)).add_attribute(Attribute::Bold),
                    Cell::new(row.journal),
                    Cell::new(row.publication_date),
                    Cell::new(row.doi),
                    Cell::new(row.non_academic_authors),
                    Cell::new(row.company_names),
                    Cell::new(row.emails),
                ]);
            }
        }
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RecordFilter;
    use crate::sources::mock::make_paper;

    fn sample() -> Vec<ClassifiedPaper> {
        RecordFilter::default().filter(vec![make_paper(
            "777",
            "A study",
            &[("Ann Lee", "Pfizer Inc., New York")],
        )])
    }

    #[test]
    fn test_auto_resolution() {
        assert_eq!(OutputFormat::Auto.resolve(true), OutputFormat::Table);
        assert_eq!(OutputFormat::Auto.resolve(false), OutputFormat::Json);
        assert_eq!(OutputFormat::Plain.resolve(true), OutputFormat::Plain);
    }

    #[test]
    fn test_json_uses_column_names() {
        let json = render(&sample(), OutputFormat::Json, ReportLayout::Standard).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["PubmedID"], "777");
        assert_eq!(value[0]["Company Affiliation(s)"], "Pfizer Inc.");
        assert_eq!(value[0]["Corresponding Author Email"], "unknown");
    }

    #[test]
    fn test_plain_output() {
        let text = render(&sample(), OutputFormat::Plain, ReportLayout::Detailed).unwrap();
        assert!(text.starts_with("777 - A study (2024)"));
        assert!(text.contains("  Companies: Pfizer Inc."));
        assert!(text.contains("  URL: https://pubmed.ncbi.nlm.nih.gov/777/"));
    }

    #[test]
    fn test_table_contains_rows() {
        let text = render(&sample(), OutputFormat::Table, ReportLayout::Standard).unwrap();
        assert!(text.contains("PubmedID"));
        assert!(text.contains("Ann Lee"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
