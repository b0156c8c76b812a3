use crate::chunk::{Chunk, ChunkFactory};
use crate::config::ChunkingConfig;
use crate::cover;
use crate::docx_reader::DocxData;
use crate::epub_reader::EpubData;
use crate::error::{Error, Result};
use crate::metadata::BookMetadata;
use crate::policy::SegmentationPolicy;
use crate::reader::BookReader;
use crate::segmenter::Segmenter;
use std::path::Path;

/// Input formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Epub,
    Docx,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "epub" => Ok(Format::Epub),
            // .doc is routed here too; only the OOXML container actually parses
            "docx" | "doc" => Ok(Format::Docx),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A logical unit that could not be loaded and was skipped.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub index: usize,
    pub path: String,
    pub reason: String,
}

/// Everything ingestion produces for one book.
#[derive(Debug, Clone)]
pub struct ParsedBook {
    pub metadata: BookMetadata,
    pub chunks: Vec<Chunk>,
    pub cover: Option<String>,
    pub failures: Vec<UnitFailure>,
}

/// Open the loader matching the file's extension.
pub fn open_reader(path: &Path) -> Result<Box<dyn BookReader>> {
    let reader: Box<dyn BookReader> = match Format::from_path(path)? {
        Format::Epub => Box::new(EpubData::open(path)?),
        Format::Docx => Box::new(DocxData::open(path)?),
    };
    Ok(reader)
}

pub fn parse_book(path: &Path, config: &ChunkingConfig) -> Result<ParsedBook> {
    let reader = open_reader(path)?;
    chunk_book(reader.as_ref(), config)
}

/// Segment every unit of `reader`, in order, into one chunk sequence.
///
/// Units that fail to load are skipped and recorded; only a book whose
/// every unit fails is an error.
pub fn chunk_book(reader: &dyn BookReader, config: &ChunkingConfig) -> Result<ParsedBook> {
    let metadata = BookMetadata::from_metadata(&reader.metadata());
    let cover = cover::resolve_cover(reader);
    let units = reader.units()?;
    let toc = reader.toc();

    let mut segmenter = Segmenter::new(
        SegmentationPolicy::new(config),
        ChunkFactory::new(metadata.title.clone(), metadata.creator.clone()),
        reader.initial_chapter(),
    );
    let mut failures = Vec::new();

    for (index, path) in units.iter().enumerate() {
        segmenter.begin_unit(&toc, path);

        match reader.load_unit(index) {
            Ok(root) => {
                let before = segmenter.chunks().len();
                segmenter.traverse(&root);
                tracing::debug!(
                    unit = index,
                    path = %path,
                    chapter = segmenter.chapter(),
                    emitted = segmenter.chunks().len() - before,
                    "Segmented unit"
                );
            }
            Err(e) => {
                tracing::warn!(unit = index, path = %path, error = %e, "Skipping unit");
                failures.push(UnitFailure {
                    index,
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if !units.is_empty() && failures.len() == units.len() {
        return Err(Error::Load(format!(
            "none of the {} document units could be read",
            units.len()
        )));
    }

    let mut chunks = segmenter.finish();
    if let (Some(first), Some(cover)) = (chunks.first_mut(), cover.as_ref()) {
        first.cover_image = Some(cover.clone());
    }

    tracing::info!(
        title = %metadata.title,
        chunks = chunks.len(),
        units = units.len(),
        failed_units = failures.len(),
        has_cover = cover.is_some(),
        "Parsed book"
    );

    Ok(ParsedBook {
        metadata,
        chunks,
        cover,
        failures,
    })
}
