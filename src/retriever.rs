//! Passage retrieval for the document handler.
//!
//! `Retriever` is the seam the document handler queries. `PassageStore` implements it
//! on top of the SQLite FTS5 index and also owns ingestion of plain-text sources.

mod chunker;
mod store;

use std::fmt;

use thiserror::Error;

pub use chunker::{CHUNK_OVERLAP, CHUNK_SIZE, chunk_text};
pub use store::{DEFAULT_TOP_K, IngestReport, PassageStore, StoreStats};

/// A retrieved passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: String,
    source: Option<String>,
}

impl Document {
    /// Creates a document with no recorded source.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    /// Records where the passage came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the passage text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the source the passage was ingested from, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Errors raised while querying a retriever.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// The backing store rejected the query
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A previous panic left the store unusable
    #[error("Passage store lock poisoned")]
    Poisoned,
}

/// Returns documents relevant to a query.
pub trait Retriever: Send + Sync {
    /// Returns documents ordered by decreasing relevance, possibly empty.
    fn query(&self, text: &str) -> Result<Vec<Document>, RetrieverError>;
}
