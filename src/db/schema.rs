/// Schema for the passage store.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
pub const INITIAL_SCHEMA: &str = r#"
-- Documents table: one row per ingested source file
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL UNIQUE,
    ingested_at INTEGER NOT NULL
);

-- Passages table: overlapping chunks of each document, in reading order
CREATE TABLE IF NOT EXISTS passages (
    id INTEGER PRIMARY KEY,
    document_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_passages_document ON passages(document_id, position);
"#;

/// FTS5 index over passage content, backed by the passages table.
pub const FTS_TABLE_CREATION: &str = r#"
CREATE VIRTUAL TABLE passages_fts USING fts5(
    content,
    content='passages',
    content_rowid='id',
    tokenize='unicode61 remove_diacritics 2'
);
"#;

/// Triggers keeping `passages_fts` in step with `passages`.
pub const FTS_TRIGGERS: &str = r#"
CREATE TRIGGER IF NOT EXISTS passages_fts_insert AFTER INSERT ON passages BEGIN
    INSERT INTO passages_fts (rowid, content) VALUES (new.id, new.content);
END;

CREATE TRIGGER IF NOT EXISTS passages_fts_delete AFTER DELETE ON passages BEGIN
    INSERT INTO passages_fts (passages_fts, rowid, content) VALUES ('delete', old.id, old.content);
END;
"#;
