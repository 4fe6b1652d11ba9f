//! Per-author record combining raw metadata with classification results.

use serde::Serialize;

use crate::classify::{classify, extract_email, is_corresponding};
use crate::models::record::RawAuthor;

/// One author of a paper, classified.
///
/// Built once from a name and an affiliation; never mutated afterwards. The
/// company name is only ever present for non-academic authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    name: String,
    affiliation: String,
    email: Option<String>,
    is_corresponding: bool,
    is_non_academic: bool,
    company_name: Option<String>,
}

impl AuthorRecord {
    /// Build a record by running email extraction and affiliation
    /// classification over `affiliation`.
    pub fn new(name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        let affiliation = affiliation.into();
        let classification = classify(&affiliation);

        Self {
            name: name.into(),
            email: extract_email(&affiliation),
            is_corresponding: is_corresponding(&affiliation),
            is_non_academic: classification.is_non_academic,
            company_name: classification.company_name,
            affiliation,
        }
    }

    /// Build a record from a raw source author.
    pub fn from_raw(raw: &RawAuthor) -> Self {
        Self::new(
            raw.display_name(),
            raw.affiliation.as_deref().unwrap_or_default(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_corresponding(&self) -> bool {
        self.is_corresponding
    }

    pub fn is_non_academic(&self) -> bool {
        self.is_non_academic
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::UNKNOWN_AUTHOR;

    #[test]
    fn test_industry_author() {
        let author = AuthorRecord::new(
            "Jane Doe",
            "Acme Biotech, Boston, MA, USA. Corresponding author: jane@acmebio.com",
        );

        assert_eq!(author.name(), "Jane Doe");
        assert_eq!(author.email(), Some("jane@acmebio.com"));
        assert!(author.is_corresponding());
        assert!(author.is_non_academic());
        assert_eq!(author.company_name(), Some("Acme Biotech"));
    }

    #[test]
    fn test_academic_author() {
        let author = AuthorRecord::new("John Roe", "Harvard Medical School, Boston, MA");

        assert!(!author.is_non_academic());
        assert_eq!(author.company_name(), None);
        assert_eq!(author.email(), None);
        assert!(!author.is_corresponding());
    }

    #[test]
    fn test_from_raw_without_affiliation() {
        let author = AuthorRecord::from_raw(&RawAuthor::default());

        assert_eq!(author.name(), UNKNOWN_AUTHOR);
        assert_eq!(author.affiliation(), "");
        assert!(!author.is_non_academic());
        assert_eq!(author.company_name(), None);
    }

    #[test]
    fn test_company_name_implies_non_academic() {
        let affiliations = [
            "",
            "Pfizer Inc., New York",
            "Stanford University and Genentech Inc",
            "acme pharma",
            "Acme, Boston",
        ];

        for affiliation in affiliations {
            let author = AuthorRecord::new("A", affiliation);
            if author.company_name().is_some() {
                assert!(author.is_non_academic(), "{affiliation}");
            }
        }
    }
}
