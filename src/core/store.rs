//! Persistent commit and release history.
//!
//! Records live in a SQLite database (`<data_dir>/commitcraft/commits.db`)
//! and are always scoped by workspace, the absolute path of the repository.
//! The engine talks to the [`RecordStore`] trait so tests can use an
//! in-memory database.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the user data directory")]
    NoDataDir,
}

/// A persisted commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub id: i64,
    pub commit_type: String,
    pub scope: String,
    /// Short description the user typed
    pub message_original: String,
    /// Final message produced by the pipeline (possibly hand-edited)
    pub message_translated: String,
    /// Staged diff the message was built from
    pub diff_snapshot: String,
    pub workspace: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted release note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRecord {
    pub id: i64,
    pub release_type: String,
    pub title: String,
    pub body: String,
    pub branch: String,
    pub commit_hashes: Vec<String>,
    pub version: String,
    pub workspace: String,
    pub created_at: DateTime<Utc>,
}

/// Storage operations used by the engine.
pub trait RecordStore {
    /// Insert a commit and return its new id. `record.id` is ignored.
    fn create_commit(&mut self, record: &CommitRecord) -> Result<i64, StoreError>;

    /// Overwrite the commit with `record.id`.
    fn update_commit(&mut self, record: &CommitRecord) -> Result<(), StoreError>;

    /// Commits of `workspace`, newest first.
    fn list_commits(&self, workspace: &str) -> Result<Vec<CommitRecord>, StoreError>;

    fn delete_commit(&mut self, id: i64) -> Result<(), StoreError>;

    /// Insert a release and return its new id. `record.id` is ignored.
    fn create_release(&mut self, record: &ReleaseRecord) -> Result<i64, StoreError>;

    /// Releases of `workspace`, newest first.
    fn list_releases(&self, workspace: &str) -> Result<Vec<ReleaseRecord>, StoreError>;

    fn delete_release(&mut self, id: i64) -> Result<(), StoreError>;
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS commits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        scope TEXT NOT NULL,
        message_original TEXT NOT NULL,
        message_translated TEXT NOT NULL,
        diff_snapshot TEXT NOT NULL DEFAULT '',
        workspace TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_commits_workspace ON commits(workspace);

    CREATE TABLE IF NOT EXISTS releases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        branch TEXT NOT NULL,
        commit_hashes TEXT NOT NULL,
        version TEXT NOT NULL DEFAULT '',
        workspace TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_releases_workspace ON releases(workspace);
"#;

/// SQLite-backed [`RecordStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Default database location.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        crate::core::Config::data_dir().map(|dir| dir.join("commits.db")).ok_or(StoreError::NoDataDir)
    }

    /// Open (and create if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!(path = %path.display(), "opened record store");

        Self::with_connection(conn)
    }

    /// A throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc)).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn split_hashes(joined: &str) -> Vec<String> {
    joined.split(',').filter(|h| !h.is_empty()).map(str::to_string).collect()
}

fn map_commit_row(row: &Row) -> rusqlite::Result<CommitRecord> {
    let created_at: String = row.get(7)?;
    Ok(CommitRecord {
        id: row.get(0)?,
        commit_type: row.get(1)?,
        scope: row.get(2)?,
        message_original: row.get(3)?,
        message_translated: row.get(4)?,
        diff_snapshot: row.get(5)?,
        workspace: row.get(6)?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

fn map_release_row(row: &Row) -> rusqlite::Result<ReleaseRecord> {
    let hashes: String = row.get(5)?;
    let created_at: String = row.get(8)?;
    Ok(ReleaseRecord {
        id: row.get(0)?,
        release_type: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        branch: row.get(4)?,
        commit_hashes: split_hashes(&hashes),
        version: row.get(6)?,
        workspace: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
    })
}

impl RecordStore for SqliteStore {
    fn create_commit(&mut self, record: &CommitRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO commits (type, scope, message_original, message_translated, diff_snapshot, workspace, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.commit_type,
                record.scope,
                record.message_original,
                record.message_translated,
                record.diff_snapshot,
                record.workspace,
                record.created_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, workspace = %record.workspace, "commit saved");
        Ok(id)
    }

    fn update_commit(&mut self, record: &CommitRecord) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE commits SET type = ?1, scope = ?2, message_original = ?3, message_translated = ?4, diff_snapshot = ?5
             WHERE id = ?6",
            params![
                record.commit_type,
                record.scope,
                record.message_original,
                record.message_translated,
                record.diff_snapshot,
                record.id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        tracing::info!(id = record.id, "commit updated");
        Ok(())
    }

    fn list_commits(&self, workspace: &str) -> Result<Vec<CommitRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, scope, message_original, message_translated, diff_snapshot, workspace, created_at
             FROM commits WHERE workspace = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let records = stmt
            .query_map(params![workspace], map_commit_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn delete_commit(&mut self, id: i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM commits WHERE id = ?1", params![id])?;
        tracing::info!(id, "commit deleted");
        Ok(())
    }

    fn create_release(&mut self, record: &ReleaseRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO releases (type, title, body, branch, commit_hashes, version, workspace, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.release_type,
                record.title,
                record.body,
                record.branch,
                record.commit_hashes.join(","),
                record.version,
                record.workspace,
                record.created_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, workspace = %record.workspace, "release saved");
        Ok(id)
    }

    fn list_releases(&self, workspace: &str) -> Result<Vec<ReleaseRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, title, body, branch, commit_hashes, version, workspace, created_at
             FROM releases WHERE workspace = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let records = stmt
            .query_map(params![workspace], map_release_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn delete_release(&mut self, id: i64) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM releases WHERE id = ?1", params![id])?;
        tracing::info!(id, "release deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn commit(workspace: &str, message: &str, minute: u32) -> CommitRecord {
        CommitRecord {
            id: 0,
            commit_type: "FIX".to_string(),
            scope: "src".to_string(),
            message_original: message.to_string(),
            message_translated: format!("{message} (translated)"),
            diff_snapshot: "=== a.rs ===\n+x\n".to_string(),
            workspace: workspace.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_commits_are_scoped_by_workspace() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_commit(&commit("/repo/a", "first", 0)).unwrap();
        store.create_commit(&commit("/repo/a", "second", 5)).unwrap();
        store.create_commit(&commit("/repo/b", "other", 3)).unwrap();

        let listed = store.list_commits("/repo/a").unwrap();
        let messages: Vec<_> = listed.iter().map(|c| c.message_original.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(listed[0].diff_snapshot, "=== a.rs ===\n+x\n");
        assert_eq!(listed[0].created_at, Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap());
    }

    #[test]
    fn test_update_and_delete_commit() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.create_commit(&commit("/repo", "first", 0)).unwrap();

        let mut edited = store.list_commits("/repo").unwrap().remove(0);
        assert_eq!(edited.id, id);
        edited.message_translated = "hand edited".to_string();
        store.update_commit(&edited).unwrap();
        assert_eq!(store.list_commits("/repo").unwrap()[0].message_translated, "hand edited");

        store.delete_commit(id).unwrap();
        assert!(store.list_commits("/repo").unwrap().is_empty());

        assert!(store.update_commit(&edited).is_err());
    }

    #[test]
    fn test_release_round_trip_keeps_hash_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let record = ReleaseRecord {
            id: 0,
            release_type: "MINOR".to_string(),
            title: "v1.2".to_string(),
            body: "- stuff".to_string(),
            branch: "main".to_string(),
            commit_hashes: vec!["c3".to_string(), "c1".to_string()],
            version: String::new(),
            workspace: "/repo".to_string(),
            created_at: Utc::now(),
        };

        let id = store.create_release(&record).unwrap();
        let listed = store.list_releases("/repo").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].commit_hashes, vec!["c3", "c1"]);

        store.delete_release(id).unwrap();
        assert!(store.list_releases("/repo").unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("commits.db");
        let mut store = SqliteStore::open(&path).unwrap();
        store.create_commit(&commit("/repo", "persisted", 0)).unwrap();
        drop(store);

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.list_commits("/repo").unwrap().len(), 1);
    }
}
