//! Core data models: raw source records, classified authors and papers.

mod author;
mod paper;
mod record;
mod search;

pub use author::AuthorRecord;
pub use paper::{Paper, PaperBuilder, UNKNOWN_TITLE};
pub use record::{ArticleRecord, PubDate, RawAuthor, UNKNOWN_AUTHOR, UNKNOWN_DATE};
pub use search::{SearchQuery, SortBy, DEFAULT_MAX_RESULTS};
