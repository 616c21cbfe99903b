// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! `Database` wraps a single `tokio_rusqlite::Connection`; all closure calls
//! are serialized on one background thread, which eliminates SQLITE_BUSY
//! errors under concurrent access. The [`Database::transaction`] helper runs a
//! synchronous closure inside one `BEGIN`/`COMMIT`, rolling back when the
//! closure returns a domain error so no operation can partially commit.

use outdial_core::OutdialError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Convert a tokio-rusqlite error into the storage error kind.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> OutdialError {
    OutdialError::Storage {
        source: Box::new(e),
    }
}

/// Convert a rusqlite error into the storage error kind.
pub fn db_err(e: rusqlite::Error) -> OutdialError {
    OutdialError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single-writer SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, OutdialError> {
        Self::open_with(path, true).await
    }

    /// Open with explicit WAL-mode choice (from `storage.wal_mode`).
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, OutdialError> {
        let conn = Connection::open(path.to_string())
            .await
            .map_err(map_tr_err)?;
        Self::prepare(conn, wal_mode, path).await
    }

    /// Open an in-memory database with migrations applied. WAL mode does not
    /// apply to in-memory databases.
    pub async fn open_in_memory() -> Result<Self, OutdialError> {
        let conn = Connection::open_in_memory().await.map_err(map_tr_err)?;
        Self::prepare(conn, false, ":memory:").await
    }

    async fn prepare(conn: Connection, wal_mode: bool, path: &str) -> Result<Self, OutdialError> {
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            crate::migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a single transaction on the writer thread.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns a domain
    /// error. The closure receives a `Transaction`, which derefs to
    /// `rusqlite::Connection`, so the synchronous query modules compose
    /// freely inside it.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T, OutdialError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, OutdialError> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                match f(&tx) {
                    Ok(value) => {
                        tx.commit()?;
                        Ok(Ok(value))
                    }
                    Err(domain) => {
                        tx.rollback()?;
                        Ok(Err(domain))
                    }
                }
            })
            .await
            .map_err(map_tr_err)?
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), OutdialError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists(), "database file should be created");

        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transaction_commits_on_ok() {
        let db = Database::open_in_memory().await.unwrap();
        db.transaction(|tx| {
            tx.execute(
                "INSERT INTO contacts (name, phone) VALUES ('A', '+48100')",
                [],
            )
            .map_err(db_err)?;
            Ok(())
        })
        .await
        .unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn transaction_rolls_back_on_domain_error() {
        let db = Database::open_in_memory().await.unwrap();
        let result: Result<(), _> = db
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO contacts (name, phone) VALUES ('B', '+48200')",
                    [],
                )
                .map_err(db_err)?;
                Err(OutdialError::Internal("abort".into()))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 0, "rolled-back insert must not be visible");
    }

    #[tokio::test]
    async fn concurrent_writers_no_sqlite_busy() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let conn = db.connection().clone();
            handles.push(tokio::spawn(async move {
                conn.call(move |conn| {
                    conn.execute(
                        "INSERT INTO contacts (name, phone) VALUES (?1, ?2)",
                        rusqlite::params![format!("c-{i}"), format!("+4850{i}")],
                    )?;
                    Ok(())
                })
                .await
            }));
        }
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "concurrent write failed: {result:?}");
        }

        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 10);

        db.close().await.unwrap();
    }
}
