//! Persistence contracts and their implementations.
//!
//! Large, rarely-written payloads (chunks, covers, images) go through a
//! [`KvStore`]; the small, frequently-rewritten shelf list goes through a
//! [`ShelfStore`].

use crate::error::Result;
use crate::shelf::BookRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Logical partitions of the payload store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Chunk sequences, keyed by book id
    Chunks,
    /// Cover data URLs, keyed by book id
    Covers,
    /// Auxiliary images, keyed by `book_id|path`
    Images,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Chunks => "books",
            Namespace::Covers => "covers",
            Namespace::Images => "images",
        }
    }
}

pub trait KvStore: Send + Sync {
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()>;
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>>;
    fn delete(&self, ns: Namespace, key: &str) -> Result<()>;
    /// Delete every key in `ns` starting with `prefix`; returns how many.
    fn delete_prefix(&self, ns: Namespace, prefix: &str) -> Result<usize>;
}

/// SQLite-backed payload store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA encoding = 'UTF-8'", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (namespace, key)
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KvStore for SqliteStore {
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)",
            params![ns.as_str(), key, value],
        )?;
        Ok(())
    }

    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock()?;
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                params![ns.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![ns.as_str(), key],
        )?;
        Ok(())
    }

    fn delete_prefix(&self, ns: Namespace, prefix: &str) -> Result<usize> {
        let conn = self.conn.lock()?;
        // substr comparison instead of LIKE: keys may contain % and _
        let removed = conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND substr(key, 1, length(?2)) = ?2",
            params![ns.as_str(), prefix],
        )?;
        Ok(removed)
    }
}

/// Volatile payload store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<(Namespace, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .lock()?
            .insert((ns, key.to_string()), value.to_vec());
        Ok(())
    }

    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock()?.get(&(ns, key.to_string())).cloned())
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        self.entries.lock()?.remove(&(ns, key.to_string()));
        Ok(())
    }

    fn delete_prefix(&self, ns: Namespace, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.lock()?;
        let before = entries.len();
        entries.retain(|(n, key), _| !(*n == ns && key.starts_with(prefix)));
        Ok(before - entries.len())
    }
}

/// Whole-collection storage for the shelf list.
///
/// Callers serialize access; implementations need not be thread-safe.
pub trait ShelfStore: Send {
    fn load(&self) -> Result<Vec<BookRecord>>;
    fn save(&mut self, shelf: &[BookRecord]) -> Result<()>;
}

/// Shelf kept as one JSON document on disk.
pub struct JsonShelf {
    path: PathBuf,
}

impl JsonShelf {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ShelfStore for JsonShelf {
    fn load(&self) -> Result<Vec<BookRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&self.path)?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&mut self, shelf: &[BookRecord]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Write-then-rename so a crash never leaves a truncated shelf
        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, shelf)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryShelf {
    books: Vec<BookRecord>,
}

impl MemoryShelf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShelfStore for MemoryShelf {
    fn load(&self) -> Result<Vec<BookRecord>> {
        Ok(self.books.clone())
    }

    fn save(&mut self, shelf: &[BookRecord]) -> Result<()> {
        self.books = shelf.to_vec();
        Ok(())
    }
}
