use rusqlite::{params, Connection, OptionalExtension};

use crate::{DbError, DbResult};

const LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at INTEGER NOT NULL DEFAULT (unixepoch()),
    PRIMARY KEY (module, id)
);";

/// One forward-only schema change owned by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    pub module: String,
    pub id: String,
    pub sql: String,
}

/// Each script runs in its own transaction together with its ledger row.
pub(crate) fn apply(conn: &mut Connection, scripts: &[MigrationScript]) -> DbResult<usize> {
    conn.execute_batch(LEDGER_SQL)?;

    let mut applied = 0;
    for script in scripts {
        let seen = conn
            .query_row(
                "SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2",
                params![script.module, script.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if seen {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(&script.sql)
            .map_err(|source| DbError::Migration {
                module: script.module.clone(),
                id: script.id.clone(),
                source,
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
            params![script.module, script.id],
        )?;
        tx.commit()?;

        tracing::info!(
            target: "libris-db",
            module = %script.module,
            id = %script.id,
            "migration applied"
        );
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(id: &str, sql: &str) -> MigrationScript {
        MigrationScript {
            module: "books".to_string(),
            id: id.to_string(),
            sql: sql.to_string(),
        }
    }

    #[test]
    fn test_migrations_apply_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        let scripts = vec![
            script("001_init", "CREATE TABLE book (id TEXT PRIMARY KEY);"),
            script("002_title", "ALTER TABLE book ADD COLUMN title TEXT;"),
        ];

        assert_eq!(apply(&mut conn, &scripts).unwrap(), 2);
        assert_eq!(apply(&mut conn, &scripts).unwrap(), 0);

        conn.execute("INSERT INTO book (id, title) VALUES ('a', 'b')", [])
            .unwrap();
    }

    #[test]
    fn test_failed_migration_is_not_recorded() {
        let mut conn = Connection::open_in_memory().unwrap();
        let scripts = vec![script("001_broken", "CREATE TABLE ;")];

        let err = apply(&mut conn, &scripts).unwrap_err();
        assert!(matches!(err, DbError::Migration { ref id, .. } if id == "001_broken"));

        let recorded: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(recorded, 0);
    }
}
