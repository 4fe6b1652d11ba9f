//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::{ArticleRecord, SearchQuery};
use crate::sources::{Source, SourceError};

/// A mock source that serves predefined records.
///
/// Search returns the registered ids in insertion order, truncated to the
/// query's `max_results`.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Vec<String>,
    records: HashMap<String, ArticleRecord>,
    failing: HashSet<String>,
    search_error: Option<String>,
    fetch_calls: AtomicUsize,
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record that search returns and fetch serves.
    pub fn with_record(mut self, record: ArticleRecord) -> Self {
        self.ids.push(record.pmid.clone());
        self.records.insert(record.pmid.clone(), record);
        self
    }

    /// Register an id that search returns but whose fetch fails.
    pub fn with_failing_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.ids.push(id.clone());
        self.failing.insert(id);
        self
    }

    /// Register an id that search returns but that has no article.
    pub fn with_missing_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Make every search fail with a network error.
    pub fn with_search_error(mut self, message: impl Into<String>) -> Self {
        self.search_error = Some(message.into());
        self
    }

    /// Number of `fetch_details` calls made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        if let Some(message) = &self.search_error {
            return Err(SourceError::Network(message.clone()));
        }

        Ok(self.ids.iter().take(query.max_results).cloned().collect())
    }

    async fn fetch_details(&self, id: &str) -> Result<Option<ArticleRecord>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(id) {
            return Err(SourceError::Network(format!("connection reset fetching {}", id)));
        }

        Ok(self.records.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_search_and_fetch() {
        let source = MockSource::new()
            .with_record(ArticleRecord::new("1").title("First"))
            .with_failing_id("2")
            .with_missing_id("3");

        let ids = tokio_test::assert_ok!(source.search(&SearchQuery::new("anything")).await);
        assert_eq!(ids, vec!["1", "2", "3"]);

        let truncated = source
            .search(&SearchQuery::new("anything").max_results(1))
            .await
            .unwrap();
        assert_eq!(truncated, vec!["1"]);

        assert!(source.fetch_details("1").await.unwrap().is_some());
        tokio_test::assert_err!(source.fetch_details("2").await);
        assert!(source.fetch_details("3").await.unwrap().is_none());
        assert_eq!(source.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_search_error() {
        let source = MockSource::new().with_search_error("offline");
        assert!(matches!(
            source.search(&SearchQuery::new("x")).await,
            Err(SourceError::Network(_))
        ));
    }
}
