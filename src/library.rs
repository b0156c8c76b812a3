//! The reader's library: shelf metadata plus chunk payloads.

use crate::chunk::Chunk;
use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::image;
use crate::ingest::{self, ParsedBook};
use crate::reader::{BookReader, ImageResource};
use crate::shelf::{self, BookRecord, Direction};
use crate::storage::{JsonShelf, KvStore, MemoryShelf, MemoryStore, Namespace, ShelfStore, SqliteStore};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

pub const DATABASE_FILE: &str = "library.db";
pub const SHELF_FILE: &str = "shelf.json";

/// Persistence context for ingestion and shelf operations.
///
/// Every shelf mutation is a read-modify-write of the whole list done under
/// one lock, so concurrent progress updates, bookmark toggles and reorders
/// never overwrite each other.
pub struct Library {
    payloads: Box<dyn KvStore>,
    shelf: Mutex<Box<dyn ShelfStore>>,
}

impl Library {
    pub fn new(payloads: Box<dyn KvStore>, shelf: Box<dyn ShelfStore>) -> Self {
        Self {
            payloads,
            shelf: Mutex::new(shelf),
        }
    }

    /// Open (creating if needed) the library stored in `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let payloads = SqliteStore::open(dir.join(DATABASE_FILE))?;
        let shelf = JsonShelf::new(dir.join(SHELF_FILE));
        tracing::debug!(dir = %dir.display(), "Opened library");
        Ok(Self::new(Box::new(payloads), Box::new(shelf)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryShelf::new()))
    }

    /// Release the underlying stores.
    pub fn close(self) {
        drop(self);
    }

    /// Parse the file at `path` and shelve it.
    pub fn add_book(&self, path: &Path, config: &ChunkingConfig, with_images: bool) -> Result<String> {
        let reader = ingest::open_reader(path)?;
        self.add_reader(reader.as_ref(), config, with_images)
    }

    pub fn add_reader(
        &self,
        reader: &dyn BookReader,
        config: &ChunkingConfig,
        with_images: bool,
    ) -> Result<String> {
        let parsed = ingest::chunk_book(reader, config)?;

        let images = if with_images {
            reader.images().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to extract images");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        self.add_parsed(&parsed, &images)
    }

    /// Store a parsed book. The shelf entry is written last; if anything
    /// fails, the payload written so far is removed again.
    pub fn add_parsed(&self, parsed: &ParsedBook, images: &[ImageResource]) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        let stored = self
            .write_payload(&id, parsed, images)
            .and_then(|_| self.append_record(&id, parsed));

        if let Err(e) = stored {
            tracing::warn!(book = %id, error = %e, "Rolling back partially stored book");
            self.purge_payload(&id);
            return Err(e);
        }

        tracing::info!(
            book = %id,
            title = %parsed.metadata.title,
            chunks = parsed.chunks.len(),
            images = images.len(),
            "Added book"
        );
        Ok(id)
    }

    fn write_payload(&self, id: &str, parsed: &ParsedBook, images: &[ImageResource]) -> Result<()> {
        let chunks = serde_json::to_vec(&parsed.chunks)?;
        self.payloads.put(Namespace::Chunks, id, &chunks)?;

        if let Some(ref cover) = parsed.cover {
            self.payloads.put(Namespace::Covers, id, cover.as_bytes())?;
        }

        for img in images {
            self.payloads.put(
                Namespace::Images,
                &image::image_key(id, &img.original_href),
                &img.data,
            )?;
        }

        Ok(())
    }

    fn append_record(&self, id: &str, parsed: &ParsedBook) -> Result<()> {
        let mut store = self.shelf.lock()?;
        let mut books = store.load()?;

        books.push(BookRecord {
            id: id.to_string(),
            title: parsed.metadata.title.clone(),
            creator: parsed.metadata.creator.clone(),
            total_chunks: parsed.chunks.len(),
            last_read_index: 0,
            bookmarks: Vec::new(),
            order: shelf::next_order(&books),
            added_at: Utc::now(),
        });

        store.save(&books)
    }

    fn purge_payload(&self, id: &str) {
        let results = [
            self.payloads.delete(Namespace::Chunks, id),
            self.payloads.delete(Namespace::Covers, id),
            self.payloads
                .delete_prefix(Namespace::Images, &image::image_key_prefix(id))
                .map(|_| ()),
        ];
        for e in results.into_iter().filter_map(|r| r.err()) {
            tracing::warn!(book = %id, error = %e, "Failed to delete book payload");
        }
    }

    /// Shelf entries in display order.
    pub fn shelf(&self) -> Result<Vec<BookRecord>> {
        let mut books = self.shelf.lock()?.load()?;
        shelf::sort_by_order(&mut books);
        Ok(books)
    }

    pub fn book(&self, id: &str) -> Result<Option<BookRecord>> {
        let books = self.shelf.lock()?.load()?;
        Ok(books.into_iter().find(|b| b.id == id))
    }

    /// Shelf entry plus its chunks.
    pub fn load_book(&self, id: &str) -> Result<(BookRecord, Vec<Chunk>)> {
        let record = self
            .book(id)?
            .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

        let chunks = match self.payloads.get(Namespace::Chunks, id)? {
            Some(data) => serde_json::from_slice(&data)?,
            None => {
                tracing::warn!(book = %id, "Shelved book has no chunk payload");
                Vec::new()
            }
        };

        Ok((record, chunks))
    }

    /// Remove the shelf entry, chunk payload, cover and images of `id`.
    pub fn remove_book(&self, id: &str) -> Result<()> {
        let found = {
            let mut store = self.shelf.lock()?;
            let mut books = store.load()?;
            let before = books.len();
            books.retain(|b| b.id != id);
            let found = books.len() != before;
            if found {
                store.save(&books)?;
            }
            found
        };

        self.payloads.delete(Namespace::Chunks, id)?;
        self.payloads.delete(Namespace::Covers, id)?;
        self.payloads
            .delete_prefix(Namespace::Images, &image::image_key_prefix(id))?;

        if !found {
            return Err(Error::BookNotFound(id.to_string()));
        }
        tracing::info!(book = %id, "Removed book");
        Ok(())
    }

    /// Swap the book with its neighbor. Returns false at either end.
    pub fn move_book(&self, id: &str, direction: Direction) -> Result<bool> {
        let mut store = self.shelf.lock()?;
        let mut books = store.load()?;

        if !books.iter().any(|b| b.id == id) {
            return Err(Error::BookNotFound(id.to_string()));
        }
        if !shelf::swap_with_neighbor(&mut books, id, direction) {
            return Ok(false);
        }

        store.save(&books)?;
        Ok(true)
    }

    /// Record the reading position. Unknown ids are ignored (returns false).
    pub fn update_progress(&self, id: &str, index: usize) -> Result<bool> {
        let updated = self.update_record(id, |book| book.last_read_index = index)?;
        if updated.is_none() {
            tracing::warn!(book = %id, "Book not found for progress update");
        }
        Ok(updated.is_some())
    }

    /// Toggle a bookmark and return the resulting set; empty for unknown ids.
    pub fn toggle_bookmark(&self, id: &str, chunk_id: &str) -> Result<Vec<String>> {
        let bookmarks = self.update_record(id, |book| book.toggle_bookmark(chunk_id).to_vec())?;
        Ok(bookmarks.unwrap_or_else(|| {
            tracing::warn!(book = %id, "Book not found for bookmark toggle");
            Vec::new()
        }))
    }

    fn update_record<T>(&self, id: &str, update: impl FnOnce(&mut BookRecord) -> T) -> Result<Option<T>> {
        let mut store = self.shelf.lock()?;
        let mut books = store.load()?;

        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        let out = update(book);

        store.save(&books)?;
        Ok(Some(out))
    }

    /// Cover data URL; storage errors read as "no cover".
    pub fn cover(&self, id: &str) -> Option<String> {
        match self.payloads.get(Namespace::Covers, id) {
            Ok(data) => data.and_then(|d| String::from_utf8(d).ok()),
            Err(e) if e.is_persistence() => {
                tracing::warn!(book = %id, error = %e, "Cover lookup failed");
                None
            }
            Err(e) => {
                tracing::debug!(book = %id, error = %e, "Cover lookup failed");
                None
            }
        }
    }

    /// Covers of every shelved book that has one.
    pub fn covers(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .shelf()?
            .into_iter()
            .filter_map(|b| self.cover(&b.id).map(|c| (b.id, c)))
            .collect())
    }

    pub fn save_image(&self, id: &str, path: &str, data: &[u8]) -> Result<()> {
        self.payloads
            .put(Namespace::Images, &image::image_key(id, path), data)
    }

    /// Stored image bytes; storage errors read as "not found".
    pub fn image(&self, id: &str, path: &str) -> Option<Vec<u8>> {
        self.payloads
            .get(Namespace::Images, &image::image_key(id, path))
            .unwrap_or_else(|e| {
                tracing::debug!(book = %id, path, error = %e, "Image lookup failed");
                None
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::reader::MemoryBook;

    fn sample(title: &str) -> MemoryBook {
        MemoryBook::new(title, "Author").with_unit(
            "a.xhtml",
            Node::container("body", vec![Node::new("h1", title), Node::new("p", "Body text.")]),
        )
    }

    #[test]
    fn test_add_assigns_increasing_order() {
        let library = Library::in_memory();
        let config = ChunkingConfig::default();
        let a = library.add_reader(&sample("A"), &config, false).unwrap();
        let b = library.add_reader(&sample("B"), &config, false).unwrap();

        let shelf = library.shelf().unwrap();
        assert_eq!(shelf.len(), 2);
        assert_eq!((shelf[0].id.as_str(), shelf[0].order), (a.as_str(), 0));
        assert_eq!((shelf[1].id.as_str(), shelf[1].order), (b.as_str(), 1));
        assert_eq!(shelf[0].total_chunks, 2);
    }

    #[test]
    fn test_images_stored_only_when_requested() {
        let library = Library::in_memory();
        let config = ChunkingConfig::default();
        let book = sample("A").with_resource("Images/fig.png", b"fig".to_vec());

        let without = library.add_reader(&book, &config, false).unwrap();
        let with = library.add_reader(&book, &config, true).unwrap();
        assert_eq!(library.image(&without, "Images/fig.png"), None);
        assert_eq!(library.image(&with, "Images/fig.png"), Some(b"fig".to_vec()));
    }

    #[test]
    fn test_move_unknown_book() {
        let library = Library::in_memory();
        assert!(matches!(
            library.move_book("nope", Direction::Up),
            Err(Error::BookNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_read_image() {
        let library = Library::in_memory();
        library.save_image("b1", "Images/a.png", b"png").unwrap();
        assert_eq!(library.image("b1", "Images/a.png"), Some(b"png".to_vec()));
        assert_eq!(library.image("b1", "Images/b.png"), None);
    }
}
