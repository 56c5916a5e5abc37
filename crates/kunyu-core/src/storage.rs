use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KunyuError;
use crate::models::{decode_record, encode_record, ResourceKind};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_cache_tables.sql");

/// SQLite-backed write-once record cache.
///
/// One table per [`ResourceKind`], each mapping a record ID to its serialized
/// form. The first `put` for an ID wins; later writes are ignored. Every
/// operation fails with [`KunyuError::StorageUnavailable`] until
/// [`initialize`](Self::initialize) has been called.
#[derive(Default)]
pub struct Cache {
    conn: Mutex<Option<Connection>>,
}

impl Cache {
    /// An unopened cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, KunyuError> {
        let cache = Self::new();
        cache.initialize(path)?;
        Ok(cache)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, KunyuError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create the tables if needed and keep the connection for later calls.
    pub fn initialize(&self, path: &Path) -> Result<(), KunyuError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), "Record cache initialized");
        *self.lock() = Some(conn);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Drop the connection. Later calls fail until re-initialized.
    pub fn close(&self) {
        self.lock().take();
    }

    /// Serialized record stored under `key`, if any.
    pub fn get(&self, table: ResourceKind, key: &str) -> Result<Option<String>, KunyuError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(KunyuError::StorageUnavailable)?;
        conn.query_row(
            &format!("SELECT data FROM {} WHERE id = ?1", table.table()),
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Store `value` under `key` unless the key already exists.
    ///
    /// Returns `true` when a row was written.
    pub fn put(&self, table: ResourceKind, key: &str, value: &str) -> Result<bool, KunyuError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(KunyuError::StorageUnavailable)?;
        let written = conn.execute(
            &format!("INSERT OR IGNORE INTO {} (id, data) VALUES (?1, ?2)", table.table()),
            params![key, value],
        )?;
        Ok(written > 0)
    }

    /// [`get`](Self::get) followed by deserialization.
    pub fn get_record<T: DeserializeOwned>(
        &self,
        table: ResourceKind,
        key: &str,
    ) -> Result<Option<T>, KunyuError> {
        self.get(table, key)?
            .map(|data| decode_record(&data))
            .transpose()
    }

    /// Serialize and [`put`](Self::put) a record.
    pub fn put_record<T: Serialize>(
        &self,
        table: ResourceKind,
        key: &str,
        record: &T,
    ) -> Result<bool, KunyuError> {
        self.put(table, key, &encode_record(record)?)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Migrations ──────────────────────────────────────────────────

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), KunyuError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anime, AnimeStats};

    fn test_anime() -> Anime {
        Anime {
            id: "38691".into(),
            title: "Dr. Stone".into(),
            english_title: Some("Dr. Stone".into()),
            japanese_title: None,
            anime_type: "TV".into(),
            episodes: "24".into(),
            status: "Finished Airing".into(),
            aired: "Jul 5, 2019 to Dec 13, 2019".into(),
            duration: "24 min. per ep.".into(),
            premiered: "Summer 2019".into(),
            rating: "PG-13 - Teens 13 or older".into(),
            synopsis: "Petrified humanity.".into(),
            genres: vec!["Adventure".into(), "Comedy".into(), "Sci-Fi".into()],
            themes: vec![],
            studios: "TMS Entertainment".into(),
            producers: vec![],
            licensors: vec![],
            stats: AnimeStats::default(),
            characters: vec![],
            related: vec![],
        }
    }

    #[test]
    fn test_uninitialized_cache_is_unavailable() {
        let cache = Cache::new();
        assert!(!cache.is_initialized());
        assert!(matches!(
            cache.get(ResourceKind::Anime, "1"),
            Err(KunyuError::StorageUnavailable)
        ));
        assert!(matches!(
            cache.put(ResourceKind::Anime, "1", "{}"),
            Err(KunyuError::StorageUnavailable)
        ));
    }

    #[test]
    fn test_put_is_write_once() {
        let cache = Cache::open_memory().unwrap();
        assert!(cache.put(ResourceKind::Anime, "1", "first").unwrap());
        assert!(!cache.put(ResourceKind::Anime, "1", "second").unwrap());
        assert_eq!(
            cache.get(ResourceKind::Anime, "1").unwrap().as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_tables_are_separate() {
        let cache = Cache::open_memory().unwrap();
        cache.put(ResourceKind::Anime, "1", "anime").unwrap();
        assert_eq!(cache.get(ResourceKind::Character, "1").unwrap(), None);
        cache.put(ResourceKind::Character, "1", "character").unwrap();
        assert_eq!(
            cache.get(ResourceKind::Anime, "1").unwrap().as_deref(),
            Some("anime")
        );
    }

    #[test]
    fn test_record_roundtrip() {
        let cache = Cache::open_memory().unwrap();
        let anime = test_anime();
        cache.put_record(ResourceKind::Anime, &anime.id, &anime).unwrap();
        let fetched: Anime = cache
            .get_record(ResourceKind::Anime, "38691")
            .unwrap()
            .unwrap();
        assert_eq!(fetched, anime);
    }

    #[test]
    fn test_on_disk_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let cache = Cache::open(&path).unwrap();
        cache.put(ResourceKind::Character, "64015", "togashi").unwrap();
        cache.close();
        assert!(matches!(
            cache.get(ResourceKind::Character, "64015"),
            Err(KunyuError::StorageUnavailable)
        ));

        let reopened = Cache::open(&path).unwrap();
        assert_eq!(
            reopened.get(ResourceKind::Character, "64015").unwrap().as_deref(),
            Some("togashi")
        );
        assert!(!reopened.put(ResourceKind::Character, "64015", "other").unwrap());
    }
}
