//! Raw article records as delivered by a source, before classification.

use serde::{Deserialize, Serialize};

/// Fallback author name when neither a personal nor a collective name is present
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Fallback publication date when no year is present
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Publication date components exactly as the source reports them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl PubDate {
    /// Create a date with only a year
    pub fn year(year: impl Into<String>) -> Self {
        Self {
            year: Some(year.into()),
            ..Default::default()
        }
    }

    /// Set the month component
    pub fn month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }

    /// Set the day component
    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    /// Display form: `"2023"`, `"Mar 2023"` or `"Mar 2023, 14"`.
    ///
    /// The day is only shown together with a month; without a year the
    /// [`UNKNOWN_DATE`] sentinel is returned.
    pub fn display(&self) -> String {
        let Some(year) = self.year.as_deref() else {
            return UNKNOWN_DATE.to_string();
        };

        match (self.month.as_deref(), self.day.as_deref()) {
            (Some(month), Some(day)) => format!("{} {}, {}", month, year, day),
            (Some(month), None) => format!("{} {}", month, year),
            (None, _) => year.to_string(),
        }
    }
}

/// One author entry of a raw article record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
    pub fore_name: Option<String>,
    pub last_name: Option<String>,
    pub collective_name: Option<String>,
    pub affiliation: Option<String>,
}

impl RawAuthor {
    /// Create an author with a personal name
    pub fn person(fore_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            fore_name: Some(fore_name.into()),
            last_name: Some(last_name.into()),
            ..Default::default()
        }
    }

    /// Create a group author
    pub fn collective(name: impl Into<String>) -> Self {
        Self {
            collective_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the affiliation text
    pub fn affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Display name: "ForeName LastName", the last name alone, the collective
    /// name, or [`UNKNOWN_AUTHOR`].
    pub fn display_name(&self) -> String {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (non_empty(&self.fore_name), non_empty(&self.last_name)) {
            (Some(fore), Some(last)) => format!("{} {}", fore, last),
            (None, Some(last)) => last,
            _ => non_empty(&self.collective_name).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        }
    }
}

/// An article's metadata as fetched from a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Source identifier (PubMed ID)
    pub pmid: String,

    pub title: Option<String>,

    pub pub_date: PubDate,

    /// Authors in source order
    pub authors: Vec<RawAuthor>,
}

impl ArticleRecord {
    /// Create an empty record for an identifier
    pub fn new(pmid: impl Into<String>) -> Self {
        Self {
            pmid: pmid.into(),
            ..Default::default()
        }
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the publication date
    pub fn pub_date(mut self, date: PubDate) -> Self {
        self.pub_date = date;
        self
    }

    /// Append an author
    pub fn author(mut self, author: RawAuthor) -> Self {
        self.authors.push(author);
        self
    }
}
