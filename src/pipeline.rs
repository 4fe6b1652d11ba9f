//! Search-fetch-classify pipeline.
//!
//! A query becomes an id list, each id becomes a [`Paper`], and only papers with
//! at least one non-academic author are kept. Failures are contained per id: a
//! failed search yields no papers and a failed fetch drops only that paper.

use futures_util::{stream, StreamExt};
use std::path::Path;
use std::sync::Arc;

use crate::models::{Paper, SearchQuery};
use crate::output::{save_output, OutputError, OutputFormat};
use crate::sources::Source;
use crate::ui::FetchProgress;

/// Default number of detail fetches in flight
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Drives a [`Source`] through search and per-id detail fetches
#[derive(Debug, Clone)]
pub struct PaperFetcher {
    source: Arc<dyn Source>,
    max_concurrent: usize,
    show_progress: bool,
}

impl PaperFetcher {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            show_progress: false,
        }
    }

    /// Set the number of concurrent detail fetches (at least 1)
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Draw a progress bar on stderr while fetching
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Search for ids; a failed search is logged and yields no ids
    pub async fn search_ids(&self, query: &SearchQuery) -> Vec<String> {
        match self.source.search(query).await {
            Ok(ids) => {
                tracing::info!(source = self.source.name(), count = ids.len(), "Found papers");
                ids
            }
            Err(e) => {
                tracing::error!(source = self.source.name(), "Error searching: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch and classify one paper; failures are logged and yield `None`
    pub async fn fetch_paper(&self, id: &str) -> Option<Paper> {
        match self.source.fetch_details(id).await {
            Ok(Some(record)) => Some(Paper::from_record(&record)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(pmid = %id, "Error fetching details: {}", e);
                None
            }
        }
    }

    /// Search and fetch every matching paper, in search order
    pub async fn fetch_papers(&self, query: &SearchQuery) -> Vec<Paper> {
        let ids = self.search_ids(query).await;
        if ids.is_empty() {
            return Vec::new();
        }

        let progress = FetchProgress::new(ids.len() as u64, self.show_progress);

        let papers: Vec<Paper> = stream::iter(ids.iter())
            .map(|id| {
                let progress = progress.clone();
                async move {
                    let paper = self.fetch_paper(id).await;
                    progress.inc();
                    paper
                }
            })
            .buffered(self.max_concurrent)
            .filter_map(|paper| async move { paper })
            .collect()
            .await;

        progress.finish();
        tracing::debug!(requested = ids.len(), fetched = papers.len(), "Fetched paper details");
        papers
    }

    /// Search, fetch and keep only papers with a non-academic author
    pub async fn fetch_industry_papers(&self, query: &SearchQuery) -> Vec<Paper> {
        let papers = filter_papers_with_non_academic_authors(self.fetch_papers(query).await);
        tracing::info!(count = papers.len(), "Papers with non-academic authors");
        papers
    }
}

/// Keep only papers with at least one non-academic author, preserving order
pub fn filter_papers_with_non_academic_authors(papers: Vec<Paper>) -> Vec<Paper> {
    papers
        .into_iter()
        .filter(Paper::has_non_academic_author)
        .collect()
}

/// Run the whole pipeline and render the result
///
/// When `output_file` is given the rendered text is also written there; a
/// failed write is logged and the rendered text is still returned.
pub async fn get_papers_by_query(
    fetcher: &PaperFetcher,
    query: &SearchQuery,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<String, OutputError> {
    let papers = fetcher.fetch_industry_papers(query).await;
    let rendered = format.render(&papers)?;

    if let Some(path) = output_file {
        if let Err(e) = save_output(path, &rendered) {
            tracing::error!(path = %path.display(), "Failed to write results: {}", e);
        }
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;

    #[test]
    fn test_filter_keeps_order() {
        let papers = vec![
            PaperBuilder::new("1")
                .author("A", "Pfizer Inc., New York, NY, USA")
                .build(),
            PaperBuilder::new("2")
                .author("B", "Department of Biology, Stanford University")
                .build(),
            PaperBuilder::new("3").build(),
            PaperBuilder::new("4")
                .author("C", "Acme Biotech, Boston, MA, USA")
                .build(),
        ];

        let ids: Vec<String> = filter_papers_with_non_academic_authors(papers)
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }
}
