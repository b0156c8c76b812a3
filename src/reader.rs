use crate::chapter::TocIndex;
use crate::error::{Error, Result};
use crate::node::Node;

/// Shared image representation across all input formats
pub struct ImageResource {
    pub original_href: String,
    pub data: Vec<u8>,
}

/// Shared metadata representation across all input formats
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
}

/// Trait for reading document formats (EPUB, DOCX, etc.)
///
/// A book is a sequence of logical units (spine documents) identified by a
/// reference path. Units load independently: one failing unit does not make
/// the others unreadable.
pub trait BookReader {
    /// Extract document metadata
    fn metadata(&self) -> Metadata;
    /// Reference paths of the logical units, in reading order
    fn units(&self) -> Result<Vec<String>>;
    /// Load one unit's root node
    fn load_unit(&self, index: usize) -> Result<Node>;
    /// Table of contents for labelling units
    fn toc(&self) -> TocIndex {
        TocIndex::new()
    }
    /// Label in effect before any heading or TOC entry is seen
    fn initial_chapter(&self) -> &str {
        "Start"
    }
    /// Path of the cover image, as the format declares it
    fn cover_locator(&self) -> Option<String> {
        None
    }
    /// Fallback cover path taken from the manifest
    fn manifest_cover(&self) -> Option<String> {
        None
    }
    /// Raw bytes of a packaged resource
    fn read_resource(&self, path: &str) -> Result<Vec<u8>>;
    /// Extract embedded images
    fn images(&self) -> Result<Vec<ImageResource>>;
}

/// A book assembled in memory from already-built node trees.
///
/// Useful for sources that have no packaged file, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    metadata: Metadata,
    units: Vec<(String, std::result::Result<Node, String>)>,
    toc: TocIndex,
    initial_chapter: Option<String>,
    cover: Option<String>,
    resources: Vec<(String, Vec<u8>)>,
}

impl MemoryBook {
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            metadata: Metadata {
                title: Some(title.to_string()),
                authors: vec![author.to_string()],
                ..Metadata::default()
            },
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, path: &str, root: Node) -> Self {
        self.units.push((path.to_string(), Ok(root)));
        self
    }

    /// A unit that fails to load with `reason`.
    pub fn with_broken_unit(mut self, path: &str, reason: &str) -> Self {
        self.units.push((path.to_string(), Err(reason.to_string())));
        self
    }

    pub fn with_toc_entry(mut self, href: &str, label: &str) -> Self {
        self.toc.push(href, label);
        self
    }

    pub fn with_initial_chapter(mut self, label: &str) -> Self {
        self.initial_chapter = Some(label.to_string());
        self
    }

    /// Package a resource; the first one added under a path containing
    /// "cover" doubles as the cover image.
    pub fn with_resource(mut self, path: &str, data: Vec<u8>) -> Self {
        if self.cover.is_none() && path.to_ascii_lowercase().contains("cover") {
            self.cover = Some(path.to_string());
        }
        self.resources.push((path.to_string(), data));
        self
    }
}

impl BookReader for MemoryBook {
    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn units(&self) -> Result<Vec<String>> {
        Ok(self.units.iter().map(|(path, _)| path.clone()).collect())
    }

    fn load_unit(&self, index: usize) -> Result<Node> {
        match self.units.get(index) {
            Some((_, Ok(root))) => Ok(root.clone()),
            Some((path, Err(reason))) => Err(Error::Load(format!("{}: {}", path, reason))),
            None => Err(Error::Load(format!("No unit at {}", index))),
        }
    }

    fn toc(&self) -> TocIndex {
        self.toc.clone()
    }

    fn initial_chapter(&self) -> &str {
        self.initial_chapter.as_deref().unwrap_or("Start")
    }

    fn cover_locator(&self) -> Option<String> {
        self.cover.clone()
    }

    fn read_resource(&self, path: &str) -> Result<Vec<u8>> {
        self.resources
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Error::Load(format!("Resource not found: {}", path)))
    }

    fn images(&self) -> Result<Vec<ImageResource>> {
        Ok(self
            .resources
            .iter()
            .map(|(path, data)| ImageResource {
                original_href: path.clone(),
                data: data.clone(),
            })
            .collect())
    }
}
