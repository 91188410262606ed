//! SQLite metadata store for uploads.
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS uploads (
//!     id            INTEGER PRIMARY KEY AUTOINCREMENT,
//!     filename      TEXT NOT NULL,
//!     original_name TEXT NOT NULL,
//!     size          INTEGER NOT NULL,
//!     mime_type     TEXT,
//!     file_path     TEXT NOT NULL,
//!     uploaded_at   TEXT NOT NULL
//! );
//! ```
//!
//! `uploaded_at` is fixed-width RFC 3339 UTC with microseconds, so text
//! order is time order.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS uploads (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    filename      TEXT NOT NULL,
    original_name TEXT NOT NULL,
    size          INTEGER NOT NULL,
    mime_type     TEXT,
    file_path     TEXT NOT NULL,
    uploaded_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_uploads_uploaded_at ON uploads (uploaded_at);";

const COLUMNS: &str = "id, filename, original_name, size, mime_type, file_path, uploaded_at";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Metadata for a file about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpload {
    /// Name on disk.
    pub filename: String,
    /// Name the client sent.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type the client declared.
    pub mime_type: String,
    /// Public path the blob is served from.
    pub file_path: String,
}

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Row ID.
    pub id: i64,
    /// Name on disk.
    pub filename: String,
    /// Name the client sent.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type the client declared.
    pub mime_type: String,
    /// Public path the blob is served from.
    pub path: String,
    /// When the upload was recorded.
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let size: i64 = row.get(3)?;
        let mime_type: Option<String> = row.get(4)?;
        let uploaded_at: String = row.get(6)?;
        let uploaded_at = DateTime::parse_from_rfc3339(&uploaded_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);
        Ok(Self {
            id: row.get(0)?,
            filename: row.get(1)?,
            original_name: row.get(2)?,
            size: u64::try_from(size).unwrap_or_default(),
            mime_type: mime_type.unwrap_or_default(),
            path: row.get(5)?,
            uploaded_at,
        })
    }
}

// ---------------------------------------------------------------------------
// UploadStore
// ---------------------------------------------------------------------------

/// Handle to the upload metadata database.
pub struct UploadStore {
    conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for UploadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl UploadStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, wal_mode: bool) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), wal = wal_mode, "Upload store opened");

        Ok(Self { conn, db_path })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    // ------------------------------------------------------------------
    // Core CRUD
    // ------------------------------------------------------------------

    /// Record an upload, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn insert(&self, upload: &NewUpload) -> Result<UploadRecord> {
        self.insert_at(upload, Utc::now())
    }

    /// Record an upload with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn insert_at(&self, upload: &NewUpload, uploaded_at: DateTime<Utc>) -> Result<UploadRecord> {
        let uploaded_at = uploaded_at.trunc_subsecs(6);
        let size = i64::try_from(upload.size).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO uploads (filename, original_name, size, mime_type, file_path, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                upload.filename,
                upload.original_name,
                size,
                upload.mime_type,
                upload.file_path,
                uploaded_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!(id, filename = %upload.filename, bytes = upload.size, "Recorded upload");

        Ok(UploadRecord {
            id,
            filename: upload.filename.clone(),
            original_name: upload.original_name.clone(),
            size: upload.size,
            mime_type: upload.mime_type.clone(),
            path: upload.file_path.clone(),
            uploaded_at,
        })
    }

    /// All uploads, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn list(&self) -> Result<Vec<UploadRecord>> {
        let start = Instant::now();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {COLUMNS} FROM uploads ORDER BY uploaded_at DESC, id DESC"
        ))?;
        let records = stmt
            .query_map([], UploadRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(
            count = records.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Listed uploads"
        );
        Ok(records)
    }

    /// Look up one upload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn get(&self, id: i64) -> Result<Option<UploadRecord>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {COLUMNS} FROM uploads WHERE id = ?1"))?;
        let record = stmt
            .query_row(params![id], UploadRecord::from_row)
            .optional()?;
        Ok(record)
    }

    /// Delete one upload's metadata. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM uploads WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Number of stored uploads.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM uploads", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Copy the database to `dest_path` with SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::UploadError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Upload store backup completed"
        );
        Ok(())
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Extension trait that adds an `.optional()` combinator to `rusqlite::Result`.
///
/// Converts `Err(QueryReturnedNoRows)` into `Ok(None)`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(name: &str) -> NewUpload {
        NewUpload {
            filename: format!("file-1700000000000-42-{name}"),
            original_name: name.to_string(),
            size: 1234,
            mime_type: "image/png".to_string(),
            file_path: format!("/uploads/file-1700000000000-42-{name}"),
        }
    }

    #[test]
    fn insert_then_get() {
        let store = UploadStore::open_in_memory().expect("open");
        let record = store.insert(&sample("cat.png")).expect("insert");
        let loaded = store.get(record.id).expect("get").expect("Some");
        assert_eq!(loaded.original_name, "cat.png");
        assert_eq!(loaded.size, 1234);
        assert_eq!(loaded.mime_type, "image/png");
        assert_eq!(loaded.path, record.path);
        assert_eq!(loaded, record);
    }

    #[test]
    fn ids_are_sequential() {
        let store = UploadStore::open_in_memory().expect("open");
        let a = store.insert(&sample("a.png")).expect("insert");
        let b = store.insert(&sample("b.png")).expect("insert");
        assert_eq!(b.id, a.id + 1);
    }

    #[test]
    fn list_is_newest_first() {
        let store = UploadStore::open_in_memory().expect("open");
        let now = Utc::now();
        store.insert_at(&sample("old.png"), now - Duration::days(2)).expect("insert");
        store.insert_at(&sample("new.png"), now).expect("insert");
        store.insert_at(&sample("mid.png"), now - Duration::days(1)).expect("insert");

        let names: Vec<String> = store
            .list()
            .expect("list")
            .into_iter()
            .map(|r| r.original_name)
            .collect();
        assert_eq!(names, vec!["new.png", "mid.png", "old.png"]);
        assert_eq!(store.count().expect("count"), 3);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = UploadStore::open_in_memory().expect("open");
        assert!(store.get(99).expect("get").is_none());
    }

    #[test]
    fn delete_reports_whether_a_row_went() {
        let store = UploadStore::open_in_memory().expect("open");
        let record = store.insert(&sample("x.png")).expect("insert");
        assert!(store.delete(record.id).expect("delete"));
        assert!(!store.delete(record.id).expect("delete again"));
        assert!(store.get(record.id).expect("get").is_none());
    }

    #[test]
    fn file_store_survives_reopen_and_backs_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("uploads.db");
        {
            let store = UploadStore::open(&path, true).expect("open");
            store.insert(&sample("keep.png")).expect("insert");
            store.backup(dir.path().join("uploads.bak")).expect("backup");
        }
        let reopened = UploadStore::open(&path, true).expect("reopen");
        assert_eq!(reopened.count().expect("count"), 1);

        let restored = UploadStore::open(dir.path().join("uploads.bak"), false).expect("open backup");
        assert_eq!(restored.list().expect("list")[0].original_name, "keep.png");
    }

    #[test]
    fn record_serializes_camel_case() {
        let store = UploadStore::open_in_memory().expect("open");
        let record = store.insert(&sample("c.png")).expect("insert");
        let json = serde_json::to_value(&record).expect("json");
        assert_eq!(json["originalName"], "c.png");
        assert_eq!(json["mimeType"], "image/png");
        assert!(json["uploadedAt"].is_string());
        assert!(json["path"].as_str().expect("path").starts_with("/uploads/"));
    }
}
