//! # get-papers-list
//!
//! Fetch research papers from PubMed and keep those with at least one author
//! affiliated with a pharmaceutical or biotech company.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`classify`]: Affiliation classification and email extraction
//! - [`models`]: Core data structures (ArticleRecord, Paper, SearchQuery, etc.)
//! - [`sources`]: Source trait plus the PubMed E-utilities implementation
//! - [`pipeline`]: Search, concurrent fetch and industry filtering
//! - [`output`]: CSV, JSON and table rendering
//! - [`utils`]: Rate-limited HTTP client and retry helpers
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use get_papers_list::{get_papers_by_query, OutputFormat, PaperFetcher, PubMedSource, SearchQuery};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let source = Arc::new(PubMedSource::new()?);
//! let fetcher = PaperFetcher::new(source);
//! let csv = get_papers_by_query(
//!     &fetcher,
//!     &SearchQuery::new("cancer immunotherapy"),
//!     OutputFormat::Csv,
//!     None,
//! )
//! .await?;
//! print!("{}", csv);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{AuthorRecord, Paper, SearchQuery};
pub use output::{papers_to_csv, OutputFormat};
pub use pipeline::{filter_papers_with_non_academic_authors, get_papers_by_query, PaperFetcher};
pub use sources::{PubMedSource, Source, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
