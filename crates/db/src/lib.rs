//! SQLite database handle shared by Libris modules.
//!
//! A single connection is guarded by a mutex and every statement runs on
//! tokio's blocking pool through [`Database::call`].

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use thiserror::Error;

mod migrate;

pub use migrate::MigrationScript;

/// Path value that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Cloneable handle to the application database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: Arc<str>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish()
    }
}

impl Database {
    /// Open the database at `path`, or an in-memory one for [`IN_MEMORY`].
    pub fn open(path: &str, busy_timeout: Duration) -> DbResult<Self> {
        if path == IN_MEMORY {
            return Self::open_in_memory();
        }

        let started_at = Instant::now();
        let conn = Connection::open(Path::new(path)).inspect_err(|err| {
            tracing::error!(target: "libris-db", path, error = %err, "failed to open database");
        })?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        tracing::info!(
            target: "libris-db",
            path,
            duration_ms = started_at.elapsed().as_millis() as u64,
            "database opened"
        );

        Ok(Self::from_connection(conn, path))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::info!(target: "libris-db", "in-memory database opened");
        Ok(Self::from_connection(conn, IN_MEMORY))
    }

    fn from_connection(conn: Connection, location: &str) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            location: Arc::from(location),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run `f` with exclusive access to the connection on the blocking pool.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| E::from(DbError::Poisoned))?;
            f(&mut guard)
        })
        .await
        .map_err(|err| E::from(DbError::Join(err)))?
    }

    /// Apply every script not yet recorded; returns how many ran.
    pub async fn apply_migrations(&self, scripts: Vec<MigrationScript>) -> DbResult<usize> {
        self.call(move |conn| migrate::apply(conn, &scripts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_runs_statements() {
        let db = Database::open_in_memory().unwrap();

        let answer: i64 = db
            .call(|conn| {
                conn.query_row("SELECT 40 + 2", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .await
            .unwrap();

        assert_eq!(answer, 42);
        assert_eq!(db.location(), IN_MEMORY);
    }

    #[tokio::test]
    async fn test_open_memory_path_alias() {
        let db = Database::open(IN_MEMORY, Duration::from_millis(100)).unwrap();
        assert_eq!(db.location(), IN_MEMORY);
    }
}
