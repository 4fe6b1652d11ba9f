//! Literature sources.
//!
//! A [`Source`] turns a query into an ordered list of identifiers and an
//! identifier into a raw [`ArticleRecord`]. The pipeline only talks to this
//! trait, so the PubMed implementation can be swapped for [`MockSource`] in
//! tests.

mod pubmed;

pub mod mock;

pub use mock::MockSource;
pub use pubmed::PubMedSource;

use crate::models::{ArticleRecord, SearchQuery};
use async_trait::async_trait;

/// Interface of a literature search backend
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for identifiers matching the query, in the source's ranking order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError>;

    /// Fetch the record for one identifier
    ///
    /// `Ok(None)` means the source answered but has no article for the id.
    async fn fetch_details(&self, id: &str) -> Result<Option<ArticleRecord>, SourceError>;

    /// Validate that an identifier is correctly formatted for this source
    fn validate_id(&self, _id: &str) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success HTTP status from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SourceError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): Service Unavailable");
        assert_eq!(SourceError::RateLimit.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_xml_error_conversion() {
        let err: SourceError = quick_xml::de::from_str::<u32>("<a>not a number</a>")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
