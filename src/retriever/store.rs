//! SQLite-backed passage store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::db::Database;

use super::chunker::{CHUNK_OVERLAP, CHUNK_SIZE, chunk_text};
use super::{Document, Retriever, RetrieverError};

/// Number of passages returned per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Outcome of ingesting one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub passages: usize,
    /// True when an earlier ingestion of the same source was replaced
    pub replaced: bool,
}

/// Counts reported by `doctor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: i64,
    pub passages: i64,
}

/// Full-text passage store used as the document retriever.
///
/// Passages are ranked with FTS5's bm25. The connection sits behind a mutex so the
/// store can be shared through `Arc<dyn Retriever>`.
pub struct PassageStore {
    db: Mutex<Database>,
    top_k: usize,
}

impl PassageStore {
    /// Wraps an opened database, returning `top_k` passages per query.
    pub fn new(db: Database, top_k: usize) -> Self {
        Self {
            db: Mutex::new(db),
            top_k: top_k.max(1),
        }
    }

    /// Returns how many passages a query yields at most.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, RetrieverError> {
        self.db.lock().map_err(|_| RetrieverError::Poisoned)
    }

    /// Reads a UTF-8 text file and ingests it under its path.
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.ingest_text(&path.display().to_string(), &text)
    }

    /// Chunks `text` and stores the passages under `source`.
    ///
    /// Re-ingesting an existing source replaces its passages.
    pub fn ingest_text(&self, source: &str, text: &str) -> Result<IngestReport> {
        let chunks = chunk_text(text, CHUNK_SIZE, CHUNK_OVERLAP);
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let mut db = self.lock()?;
        let tx = db
            .connection_mut()
            .transaction()
            .context("Failed to begin transaction")?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM documents WHERE source = ?1",
                [source],
                |row| row.get(0),
            )
            .optional()?;

        let document_id = match existing {
            Some(id) => {
                tx.execute("DELETE FROM passages WHERE document_id = ?1", [id])?;
                tx.execute(
                    "UPDATE documents SET ingested_at = ?1 WHERE id = ?2",
                    params![now, id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO documents (source, ingested_at) VALUES (?1, ?2)",
                    params![source, now],
                )?;
                tx.last_insert_rowid()
            }
        };

        {
            let mut stmt = tx.prepare(
                "INSERT INTO passages (document_id, position, content) VALUES (?1, ?2, ?3)",
            )?;
            for (position, chunk) in chunks.iter().enumerate() {
                stmt.execute(params![document_id, position as i64, chunk])?;
            }
        }

        tx.commit().context("Failed to commit ingestion")?;

        info!(source, passages = chunks.len(), replaced = existing.is_some(), "ingested document");

        Ok(IngestReport {
            source: source.to_string(),
            passages: chunks.len(),
            replaced: existing.is_some(),
        })
    }

    /// Returns document and passage counts.
    pub fn stats(&self) -> Result<StoreStats> {
        let db = self.lock()?;
        let conn = db.connection();

        let documents = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        let passages = conn.query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))?;

        Ok(StoreStats {
            documents,
            passages,
        })
    }
}

impl Retriever for PassageStore {
    fn query(&self, text: &str) -> Result<Vec<Document>, RetrieverError> {
        let Some(match_expr) = build_match_expression(text) else {
            return Ok(Vec::new());
        };

        let db = self.lock()?;
        let mut stmt = db.connection().prepare(
            "SELECT p.content, d.source
             FROM passages_fts
             JOIN passages p ON p.id = passages_fts.rowid
             JOIN documents d ON d.id = p.document_id
             WHERE passages_fts MATCH ?1
             ORDER BY bm25(passages_fts), p.id
             LIMIT ?2",
        )?;

        let documents = stmt
            .query_map(params![match_expr, self.top_k as i64], |row| {
                let content: String = row.get(0)?;
                let source: String = row.get(1)?;
                Ok(Document::new(content).with_source(source))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(query = %match_expr, hits = documents.len(), "passage query");

        Ok(documents)
    }
}

/// Builds an FTS5 query matching any word of `text`.
///
/// Each token is quoted so punctuation and FTS operators in the question cannot break
/// the query syntax. Returns `None` when no usable token remains.
fn build_match_expression(text: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|t| seen.insert(t.clone()))
        .map(|t| format!("\"{}\"", t))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PassageStore {
        PassageStore::new(Database::in_memory().unwrap(), DEFAULT_TOP_K)
    }

    #[test]
    fn match_expression_quotes_and_dedupes_tokens() {
        let expr = build_match_expression("What's the CO2 plan? the plan!").unwrap();
        assert_eq!(expr, r#""what" OR "the" OR "co2" OR "plan""#);
    }

    #[test]
    fn match_expression_is_none_without_tokens() {
        assert!(build_match_expression("").is_none());
        assert!(build_match_expression("? ! a").is_none());
    }

    #[test]
    fn query_on_empty_store_returns_nothing() {
        let results = store().query("carbon budget").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn blank_query_returns_nothing() {
        let store = store();
        store.ingest_text("a.txt", "Carbon budget for 2030").unwrap();
        assert!(store.query("  ?? ").unwrap().is_empty());
    }

    #[test]
    fn query_ranks_more_relevant_passage_first() {
        let store = store();
        store
            .ingest_text("mobility.txt", "Rail freight and cycling reduce transport emissions.")
            .unwrap();
        store
            .ingest_text(
                "buildings.txt",
                "Building renovation cuts heating emissions. Renovation of buildings and heat pumps.",
            )
            .unwrap();

        let results = store.query("building renovation").unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source(), Some("buildings.txt"));
    }

    #[test]
    fn query_respects_top_k() {
        let store = PassageStore::new(Database::in_memory().unwrap(), 2);
        for i in 0..5 {
            store
                .ingest_text(&format!("doc{i}.txt"), "forest carbon sinks")
                .unwrap();
        }

        assert_eq!(store.query("forest").unwrap().len(), 2);
    }

    #[test]
    fn reingest_replaces_passages() {
        let store = store();
        let first = store.ingest_text("plan.txt", "hydrogen strategy").unwrap();
        assert!(!first.replaced);

        let second = store.ingest_text("plan.txt", "wind power strategy").unwrap();
        assert!(second.replaced);

        assert!(store.query("hydrogen").unwrap().is_empty());
        assert_eq!(store.query("wind").unwrap().len(), 1);
        assert_eq!(
            store.stats().unwrap(),
            StoreStats {
                documents: 1,
                passages: 1
            }
        );
    }

    #[test]
    fn ingest_file_reads_and_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy.txt");
        std::fs::write(&path, "Sobriété énergétique.\n\n".repeat(60)).unwrap();

        let report = store().ingest_file(&path).unwrap();

        assert!(report.passages > 1);
        assert!(report.source.ends_with("strategy.txt"));
    }

    #[test]
    fn ingest_missing_file_fails_with_context() {
        let error = store().ingest_file("/nonexistent/strategy.txt").unwrap_err();
        assert!(error.to_string().contains("Failed to read"));
    }

    #[test]
    fn diacritics_are_folded_in_queries() {
        let store = store();
        store.ingest_text("fr.txt", "Sobriété énergétique").unwrap();

        assert_eq!(store.query("energetique").unwrap().len(), 1);
    }
}
