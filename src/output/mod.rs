//! Result serialization: CSV (default), JSON and terminal tables.

use serde::Serialize;
use std::path::Path;

use crate::models::Paper;

/// CSV column headers, in order
pub const CSV_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Separator for multi-valued cells
const LIST_SEPARATOR: &str = ", ";

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
    /// Human-readable table
    Table,
}

impl OutputFormat {
    /// Render papers in this format
    pub fn render(&self, papers: &[Paper]) -> Result<String, OutputError> {
        match self {
            OutputFormat::Csv => papers_to_csv(papers),
            OutputFormat::Json => papers_to_json(papers),
            OutputFormat::Table => Ok(papers_to_table(papers)),
        }
    }
}

/// One output row: the six exported fields of a paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRow {
    pub pubmed_id: String,
    pub title: String,
    pub publication_date: String,
    pub non_academic_authors: String,
    pub company_affiliations: String,
    pub corresponding_author_email: String,
}

impl PaperRow {
    /// Flatten a paper; lists are joined with ", " and a missing email is empty
    pub fn from_paper(paper: &Paper) -> Self {
        Self {
            pubmed_id: paper.id().to_string(),
            title: paper.title().to_string(),
            publication_date: paper.publication_date().to_string(),
            non_academic_authors: paper
                .non_academic_authors()
                .into_iter()
                .map(|a| a.name())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            company_affiliations: paper.company_affiliations().join(LIST_SEPARATOR),
            corresponding_author_email: paper
                .corresponding_author_email()
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn fields(&self) -> [&str; 6] {
        [
            self.pubmed_id.as_str(),
            self.title.as_str(),
            self.publication_date.as_str(),
            self.non_academic_authors.as_str(),
            self.company_affiliations.as_str(),
            self.corresponding_author_email.as_str(),
        ]
    }
}

/// Convert papers to output rows, preserving order
pub fn to_rows(papers: &[Paper]) -> Vec<PaperRow> {
    papers.iter().map(PaperRow::from_paper).collect()
}

/// Render papers as CSV; the header row is always present
pub fn papers_to_csv(papers: &[Paper]) -> Result<String, OutputError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADERS)?;
    for row in to_rows(papers) {
        wtr.write_record(row.fields())?;
    }
    wtr.flush()?;

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Render papers as a pretty JSON array of rows
pub fn papers_to_json(papers: &[Paper]) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(&to_rows(papers))?)
}

/// Render papers as a terminal table
pub fn papers_to_table(papers: &[Paper]) -> String {
    use comfy_table::{Attribute, Cell, ContentArrangement, Table};

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(CSV_HEADERS.to_vec());

    for row in to_rows(papers) {
        table.add_row(vec![
            Cell::new(&row.pubmed_id),
            Cell::new(truncate(&row.title, 60)).add_attribute(Attribute::Bold),
            Cell::new(&row.publication_date),
            Cell::new(&row.non_academic_authors),
            Cell::new(&row.company_affiliations),
            Cell::new(&row.corresponding_author_email),
        ]);
    }

    table.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Write rendered output to a file
pub fn save_output(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Results saved");
    Ok(())
}
