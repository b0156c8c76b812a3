//! Turn EPUB and DOCX books into ordered sequences of reading chunks, and
//! keep a shelf of ingested books with their progress and bookmarks.
//!
//! Ingestion walks each document unit once. Paragraph text accumulates into
//! a buffer that is flushed into a [`chunk::Chunk`] at headings, TOC label
//! changes, long narrative paragraphs and size limits.

pub mod chapter;
pub mod chunk;
pub mod config;
pub mod cover;
pub mod docx_reader;
pub mod docx_tree;
pub mod epub_reader;
pub mod error;
pub mod html;
pub mod image;
pub mod ingest;
pub mod library;
pub mod metadata;
pub mod node;
pub mod policy;
pub mod reader;
pub mod segmenter;
pub mod shelf;
pub mod storage;

pub use chunk::{Chunk, ChunkKind};
pub use config::ChunkingConfig;
pub use error::{Error, Result};
pub use ingest::{chunk_book, parse_book, ParsedBook};
pub use library::Library;
pub use reader::BookReader;
pub use shelf::{BookRecord, Direction};
