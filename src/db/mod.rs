mod audit_tasks;
mod clients;
mod issues;
mod projects;
mod requirements;
mod schema;
mod seed;
mod users;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result as AnyResult;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ToSql};

/// Handle to the SQLite store.
///
/// Cloning is cheap; every clone shares the same connection. All operations
/// take the connection lock for their whole duration, so a parent existence
/// check and the insert that depends on it can never interleave with another
/// request's writes.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> AnyResult<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> AnyResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> AnyResult<()> {
        let conn = self.conn();
        schema::run_migrations(&conn)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Location of the database file when none is configured.
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "audit-tracker")
        .map(|dirs| dirs.data_dir().join("audit-tracker.db"))
        .unwrap_or_else(|| PathBuf::from("audit-tracker.db"))
}

// ============================================================
// Row helpers
// ============================================================

/// Equality predicates appended to a `WHERE deleted_at IS NULL` clause.
#[derive(Default)]
struct Predicates {
    clauses: Vec<&'static str>,
    params: Vec<Box<dyn ToSql>>,
}

impl Predicates {
    fn eq<T: ToSql + 'static>(mut self, column: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.clauses.push(column);
            self.params.push(Box::new(value));
        }
        self
    }

    fn sql(&self) -> String {
        self.clauses
            .iter()
            .map(|column| format!(" AND {} = ?", column))
            .collect()
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_render_only_supplied_values() {
        let predicates = Predicates::default()
            .eq("status", Some("NEW".to_string()))
            .eq::<i64>("client_id", None)
            .eq("project_id", Some(4_i64));

        assert_eq!(predicates.sql(), " AND status = ? AND project_id = ?");
        assert_eq!(predicates.params().len(), 2);
    }

    #[test]
    fn open_memory_enables_foreign_keys() {
        let db = Database::open_memory().unwrap();
        let enabled: i64 = db
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.db");

        let db = Database::open(path.clone()).unwrap();
        db.migrate().unwrap();

        assert!(path.exists());
    }
}
