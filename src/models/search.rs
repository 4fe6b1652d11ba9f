//! Search request model.

use serde::{Deserialize, Serialize};

/// Default cap on the number of identifiers requested from a search
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Ordering requested from the search API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Best match first (PubMed's default ordering)
    #[default]
    Relevance,
    /// Most recent publication first
    PublicationDate,
}

impl SortBy {
    /// Value of the E-utilities `sort` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::PublicationDate => "pub_date",
        }
    }
}

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// PubMed query string (full PubMed syntax is passed through)
    pub query: String,

    /// Maximum number of identifiers to return
    pub max_results: usize,

    /// Publication year filter: "2020", "2018-2022", "2010-" (from) or "-2015" (until)
    pub year: Option<String>,

    /// Result ordering
    pub sort_by: SortBy,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            year: None,
            sort_by: SortBy::default(),
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set year filter
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Set sort order
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by = sort;
        self
    }

    /// Inclusive `(min, max)` publication dates in `YYYY/MM/DD` form for the year filter.
    ///
    /// Returns `None` when no filter is set or it cannot be interpreted.
    pub fn date_range(&self) -> Option<(String, String)> {
        let year = self.year.as_deref()?.trim();
        let valid = |y: &str| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit());

        let (from, until) = match year.split_once('-') {
            None => (year, year),
            Some((from, "")) => (from, "3000"),
            Some(("", until)) => ("1800", until),
            Some((from, until)) => (from, until),
        };

        if !valid(from) || !valid(until) {
            return None;
        }

        Some((format!("{}/01/01", from), format!("{}/12/31", until)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("cancer immunotherapy")
            .max_results(25)
            .year("2020")
            .sort_by(SortBy::PublicationDate);

        assert_eq!(query.query, "cancer immunotherapy");
        assert_eq!(query.max_results, 25);
        assert_eq!(query.year.as_deref(), Some("2020"));
        assert_eq!(query.sort_by.as_param(), "pub_date");
    }

    #[test]
    fn test_default_max_results() {
        assert_eq!(SearchQuery::new("x").max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn test_date_range() {
        let range = |y: &str| SearchQuery::new("x").year(y).date_range();

        assert_eq!(
            range("2020"),
            Some(("2020/01/01".to_string(), "2020/12/31".to_string()))
        );
        assert_eq!(
            range("2015-2020"),
            Some(("2015/01/01".to_string(), "2020/12/31".to_string()))
        );
        assert_eq!(
            range("2010-"),
            Some(("2010/01/01".to_string(), "3000/12/31".to_string()))
        );
        assert_eq!(
            range("-2015"),
            Some(("1800/01/01".to_string(), "2015/12/31".to_string()))
        );
        assert_eq!(range("recent"), None);
        assert_eq!(SearchQuery::new("x").date_range(), None);
    }
}
