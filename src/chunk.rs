use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Text,
    Header,
}

/// One independently renderable piece of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub kind: ChunkKind,
    pub content: String,
    pub book_title: String,
    pub creator: String,
    pub chapter: String,
    pub timestamp: DateTime<Utc>,
    /// Only ever set on the first chunk of a book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

/// Stamps chunks with the book-wide fields and a per-run id counter.
#[derive(Debug, Clone)]
pub struct ChunkFactory {
    book_title: String,
    creator: String,
    next_id: usize,
}

impl ChunkFactory {
    pub fn new(book_title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            book_title: book_title.into(),
            creator: creator.into(),
            next_id: 0,
        }
    }

    pub fn text(&mut self, content: String, chapter: &str) -> Chunk {
        let id = format!("chunk-{}", self.bump());
        self.build(id, ChunkKind::Text, content, chapter.to_string())
    }

    /// Header chunks carry their own text as the chapter label.
    pub fn header(&mut self, heading: &str) -> Chunk {
        let id = format!("head-{}", self.bump());
        self.build(id, ChunkKind::Header, heading.to_string(), heading.to_string())
    }

    fn bump(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn build(&self, id: String, kind: ChunkKind, content: String, chapter: String) -> Chunk {
        Chunk {
            id,
            kind,
            content,
            book_title: self.book_title.clone(),
            creator: self.creator.clone(),
            chapter,
            timestamp: Utc::now(),
            cover_image: None,
        }
    }
}

/// Text collected since the last flush.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    buffer: String,
    len: usize,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Characters `append(text)` would add, separator included.
    pub fn appended_len(&self, text: &str) -> usize {
        let sep = if self.buffer.is_empty() { 0 } else { SEPARATOR.len() };
        sep + text.chars().count()
    }

    pub fn append(&mut self, text: &str) {
        self.len += self.appended_len(text);
        if !self.buffer.is_empty() {
            self.buffer.push_str(SEPARATOR);
        }
        self.buffer.push_str(text);
    }

    /// Emit the buffer as a text chunk under `chapter`.
    ///
    /// A whitespace-only buffer yields nothing and is left as is.
    pub fn flush(&mut self, factory: &mut ChunkFactory, chapter: &str) -> Option<Chunk> {
        let content = self.buffer.trim();
        if content.is_empty() {
            return None;
        }
        let chunk = factory.text(content.to_string(), chapter);
        self.buffer.clear();
        self.len = 0;
        Some(chunk)
    }
}
