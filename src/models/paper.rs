//! Paper model and the paper-level aggregation of author signals.

use serde::Serialize;

use crate::models::author::AuthorRecord;
use crate::models::record::{ArticleRecord, UNKNOWN_DATE};

/// Fallback title when the source has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// A PubMed paper with classified authors
///
/// Papers are immutable once built. All paper-level views (non-academic authors,
/// company affiliations, contact email) are computed on demand from the author
/// list, which keeps source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    id: String,
    title: String,
    publication_date: String,
    authors: Vec<AuthorRecord>,
}

impl Paper {
    /// Create a paper from already-classified authors
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        publication_date: impl Into<String>,
        authors: Vec<AuthorRecord>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            publication_date: publication_date.into(),
            authors,
        }
    }

    /// Build a paper from a raw source record, classifying every author
    pub fn from_record(record: &ArticleRecord) -> Self {
        let title = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TITLE);

        Self::new(
            record.pmid.clone(),
            title,
            record.pub_date.display(),
            record.authors.iter().map(AuthorRecord::from_raw).collect(),
        )
    }

    /// PubMed identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    /// Authors in source order
    pub fn authors(&self) -> &[AuthorRecord] {
        &self.authors
    }

    /// Authors classified as non-academic, in source order
    pub fn non_academic_authors(&self) -> Vec<&AuthorRecord> {
        self.authors.iter().filter(|a| a.is_non_academic()).collect()
    }

    /// Whether at least one author is non-academic
    pub fn has_non_academic_author(&self) -> bool {
        self.authors.iter().any(AuthorRecord::is_non_academic)
    }

    /// Unique company names of non-academic authors, in first-seen order
    pub fn company_affiliations(&self) -> Vec<&str> {
        let mut companies: Vec<&str> = Vec::new();
        for name in self
            .authors
            .iter()
            .filter(|a| a.is_non_academic())
            .filter_map(AuthorRecord::company_name)
        {
            if !companies.contains(&name) {
                companies.push(name);
            }
        }
        companies
    }

    /// Contact email: the first corresponding author's email, otherwise the
    /// first email of any author
    pub fn corresponding_author_email(&self) -> Option<&str> {
        self.authors
            .iter()
            .filter(|a| a.is_corresponding())
            .find_map(AuthorRecord::email)
            .or_else(|| self.authors.iter().find_map(AuthorRecord::email))
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    id: String,
    title: Option<String>,
    publication_date: Option<String>,
    authors: Vec<AuthorRecord>,
}

impl PaperBuilder {
    /// Create a new builder for a paper identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            publication_date: None,
            authors: Vec::new(),
        }
    }

    /// Set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set publication date display string
    pub fn publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = Some(date.into());
        self
    }

    /// Append an author built from a name and affiliation
    pub fn author(mut self, name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        self.authors.push(AuthorRecord::new(name, affiliation));
        self
    }

    /// Build the Paper, filling sentinels for missing fields
    pub fn build(self) -> Paper {
        Paper::new(
            self.id,
            self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            self.publication_date.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            self.authors,
        )
    }
}
