mod schema;

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use schema::{FTS_TABLE_CREATION, FTS_TRIGGERS, INITIAL_SCHEMA};

/// Database wrapper providing connection management and schema initialization.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution, then creates the FTS5 index
    /// and its triggers.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        self.initialize_fts()?;
        Ok(())
    }

    /// Creates the FTS5 virtual table and triggers if they don't exist.
    ///
    /// A freshly created index is rebuilt from any passages already stored.
    fn initialize_fts(&self) -> Result<()> {
        let fts_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='passages_fts')",
            [],
            |row| row.get(0),
        )?;

        if !fts_exists {
            self.conn.execute_batch(FTS_TABLE_CREATION)?;
            self.conn
                .execute("INSERT INTO passages_fts (passages_fts) VALUES ('rebuild')", [])?;
        }

        self.conn.execute_batch(FTS_TRIGGERS)?;

        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying connection, for transactions.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
