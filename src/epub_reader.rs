use crate::chapter::TocIndex;
use crate::error::{Error, Result};
use crate::html;
use crate::node::Node;
use crate::reader::{BookReader, ImageResource, Metadata};
use rbook::prelude::*;
use rbook::Epub;
use std::path::Path;

/// One spine document, read eagerly so later failures stay per-unit.
struct SpineDocument {
    path: String,
    html: std::result::Result<String, String>,
}

pub struct EpubData {
    epub: Epub,
    documents: Vec<SpineDocument>,
}

impl EpubData {
    pub fn open(path: &Path) -> Result<Self> {
        let epub = Epub::options()
            .strict(false)
            .open(path)
            .map_err(|e| Error::Load(format!("Failed to open EPUB {}: {}", path.display(), e)))?;
        let documents = read_spine(&epub);
        Ok(Self { epub, documents })
    }

    pub fn title(&self) -> Option<String> {
        self.epub
            .metadata()
            .title()
            .map(|t| t.value().to_string())
    }

    pub fn authors(&self) -> Vec<String> {
        let mut authors = Vec::new();
        for creator in self.epub.metadata().creators() {
            authors.push(creator.value().to_string());
        }
        authors
    }

    pub fn language(&self) -> Option<String> {
        let mut langs = self.epub.metadata().languages();
        langs.next().map(|l| l.value().to_string())
    }

    pub fn description(&self) -> Option<String> {
        let mut descs = self.epub.metadata().descriptions();
        descs.next().map(|d| d.value().to_string())
    }

    pub fn publisher(&self) -> Option<String> {
        let mut pubs = self.epub.metadata().publishers();
        pubs.next().map(|p| p.value().to_string())
    }
}

impl SpineDocument {
    /// Parsed body of the document. A blank document is an empty body, not
    /// a failed load.
    fn root(&self) -> Result<Node> {
        match &self.html {
            Ok(content) if content.trim().is_empty() => Ok(Node::container("body", Vec::new())),
            Ok(content) => Ok(html::parse_document(content)),
            Err(reason) => Err(Error::Load(format!("{}: {}", self.path, reason))),
        }
    }
}

fn read_spine(epub: &Epub) -> Vec<SpineDocument> {
    let mut documents = Vec::new();
    let mut reader = epub.reader();

    while let Some(result) = reader.read_next() {
        let document = match result {
            Ok(data) => SpineDocument {
                path: data
                    .manifest_entry()
                    .resource()
                    .key()
                    .value()
                    .unwrap_or_default()
                    .to_string(),
                html: Ok(data.content().to_string()),
            },
            Err(e) => SpineDocument {
                path: format!("#{}", documents.len()),
                html: Err(e.to_string()),
            },
        };
        documents.push(document);
    }

    documents
}

impl BookReader for EpubData {
    fn metadata(&self) -> Metadata {
        Metadata {
            title: self.title(),
            authors: self.authors(),
            publisher: self.publisher(),
            language: self.language(),
            description: self.description(),
        }
    }

    fn units(&self) -> Result<Vec<String>> {
        Ok(self.documents.iter().map(|d| d.path.clone()).collect())
    }

    fn load_unit(&self, index: usize) -> Result<Node> {
        let document = self
            .documents
            .get(index)
            .ok_or_else(|| Error::Load(format!("No spine document at {}", index)))?;

        document.root()
    }

    fn toc(&self) -> TocIndex {
        let mut index = TocIndex::new();
        let Some(root) = self.epub.toc().contents() else {
            return index;
        };

        for entry in root.flatten() {
            let href = entry
                .manifest_entry()
                .and_then(|m| m.resource().key().value().map(|v| v.to_string()));
            if let Some(href) = href {
                index.push(href, entry.label());
            }
        }

        index
    }

    fn cover_locator(&self) -> Option<String> {
        let cover = self.epub.manifest().cover_image()?;
        cover.resource().key().value().map(|v| v.to_string())
    }

    fn manifest_cover(&self) -> Option<String> {
        self.epub
            .manifest()
            .images()
            .filter_map(|entry| entry.resource().key().value().map(|v| v.to_string()))
            .find(|href| href.to_ascii_lowercase().contains("cover"))
    }

    fn read_resource(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .epub
            .manifest()
            .images()
            .find(|entry| entry.resource().key().value() == Some(path))
            .ok_or_else(|| Error::Load(format!("Resource not in manifest: {}", path)))?;

        entry
            .read_bytes()
            .map_err(|e| Error::Load(format!("Failed to read {}: {}", path, e)))
    }

    fn images(&self) -> Result<Vec<ImageResource>> {
        let mut images = Vec::new();
        for entry in self.epub.manifest().images() {
            let href = entry
                .resource()
                .key()
                .value()
                .unwrap_or("unknown")
                .to_string();

            match entry.read_bytes() {
                Ok(data) => images.push(ImageResource {
                    original_href: href,
                    data,
                }),
                Err(e) => tracing::warn!(href = %href, error = %e, "Skipping unreadable image"),
            }
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(html: std::result::Result<&str, &str>) -> SpineDocument {
        SpineDocument {
            path: "OEBPS/Text/blank.xhtml".to_string(),
            html: html.map(str::to_string).map_err(str::to_string),
        }
    }

    #[test]
    fn test_blank_document_is_empty_body() {
        let root = document(Ok("  \n\t ")).root().unwrap();
        assert_eq!(root.tag, "body");
        assert!(root.children.is_empty());
        assert!(root.text.is_empty());
    }

    #[test]
    fn test_unreadable_document_is_load_error() {
        let err = document(Err("bad zip entry")).root().unwrap_err();
        assert!(matches!(err, Error::Load(ref msg) if msg.contains("blank.xhtml")));
    }

    #[test]
    fn test_document_body_is_parsed() {
        let root = document(Ok("<html><body><p>Text</p></body></html>")).root().unwrap();
        assert_eq!(root.children[0].text, "Text");
    }
}
