// Key-value persistence backends

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Synchronous string-keyed store the task store mirrors itself into
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Keys double as file names, so keep them to a safe alphabet
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// One file per key
// ============================================================================

/// Stores each key as `<dir>/<key>.json`
///
/// Writers hold an exclusive lock on `<key>.lock`, write `<key>.json.tmp` and
/// rename it over the data file. Readers hold a shared lock on the same lock file,
/// so they see either the old value or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a file store rooted at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create data directory")?;
        debug!(path = ?base_path, "Opened file store");
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn lock_file(&self, key: &str) -> Result<File> {
        let lock_path = self.base_path.join(format!("{}.lock", key));
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {}", lock_path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        let lock = self.lock_file(key)?;
        lock.lock_shared().context("Failed to acquire shared file lock")?;

        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;

        // Lock is automatically released when the lock file is dropped
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let lock = self.lock_file(key)?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .context("Failed to open temporary data file")?;
        tmp.write_all(value.as_bytes())?;
        tmp.sync_all()?; // Ensure data is flushed to disk before it replaces the old file
        drop(tmp);

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), "Wrote key to file store");
        Ok(())
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// Stores keys in a single-table SQLite database at `<dir>/tasktrack.db`
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).context("Failed to create data directory")?;

        let db_path = base_path.join("tasktrack.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        Self::with_connection(db)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()
            .context("Failed to read key from database")?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now_ms()],
            )
            .context("Failed to write key to database")?;
        debug!(key, bytes = value.len(), "Wrote key to sqlite store");
        Ok(())
    }
}

// Helper function for timestamps
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("tasks").unwrap(), None);

        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));

        store.set("tasks", "[1]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_store_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/data");

        let store = FileStore::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip_and_overwrite() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.get("tasks").unwrap(), None);

        store.set("tasks", r#"[{"title":"long value"}]"#).unwrap();
        store.set("tasks", "[]").unwrap();

        // Shorter second write must not leave a tail of the first
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
        let on_disk = fs::read_to_string(temp.path().join("tasks.json")).unwrap();
        assert_eq!(on_disk, "[]");
    }

    #[test]
    fn test_file_store_ignores_leftover_temp_file() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.set("tasks", "[1,2,3]").unwrap();

        // A write that died before its rename leaves only the temp file behind
        fs::write(temp.path().join("tasks.json.tmp"), "[1,").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[1,2,3]"));

        store.set("tasks", "[4]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[4]"));
        assert!(!temp.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn test_file_store_reader_waits_for_writer_lock() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.set("tasks", "[1,2,3]").unwrap();

        let writer_lock = store.lock_file("tasks").unwrap();
        writer_lock.lock_exclusive().unwrap();

        let reader = store.clone();
        let handle = std::thread::spawn(move || reader.get("tasks").unwrap());

        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(!handle.is_finished(), "reader must block while the writer holds the lock");

        FileExt::unlock(&writer_lock).unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(temp.path()).unwrap();
            store.set("tasks", "persisted").unwrap();
        }
        let store = FileStore::open(temp.path()).unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);

        store.set("tasks", "first").unwrap();
        store.set("tasks", "second").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_sqlite_store_on_disk() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = SqliteStore::open(temp.path()).unwrap();
            store.set("tasks", "[]").unwrap();
        }
        assert!(temp.path().join("tasktrack.db").exists());

        let store = SqliteStore::open(temp.path()).unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_validate_key() {
        // Valid
        assert!(validate_key("tasks").is_ok());
        assert!(validate_key("my-tasks_2").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_invalid_key_rejected_by_backends() {
        let temp = TempDir::new().unwrap();
        let mut files = FileStore::open(temp.path()).unwrap();
        assert!(files.set("bad/key", "x").is_err());

        let mut db = SqliteStore::open_in_memory().unwrap();
        assert!(db.get("bad key").is_err());
        assert!(db.set("bad key", "x").is_err());
    }
}
