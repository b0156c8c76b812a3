use crate::docx_tree;
use crate::error::{Error, Result};
use crate::node::{Node, NodeKind};
use crate::reader::{BookReader, ImageResource, Metadata};
use docx_rust::DocxFile;
use std::path::Path;

/// Reference path of the single logical unit of a DOCX package.
const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxData {
    /// Parsed views borrow from the file, so each call re-parses.
    file: DocxFile,
    file_stem: Option<String>,
}

impl DocxData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = DocxFile::from_file(path)
            .map_err(|e| Error::Load(format!("Failed to open DOCX {}: {}", path.display(), e)))?;
        let file_stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string());
        Ok(Self { file, file_stem })
    }

    fn parse(&self) -> Result<docx_rust::Docx<'_>> {
        self.file
            .parse()
            .map_err(|e| Error::Load(format!("Failed to parse DOCX content: {}", e)))
    }
}

/// Text of the first level-1 heading, searched depth-first.
fn first_title_heading(node: &Node) -> Option<String> {
    if node.kind() == NodeKind::Heading(1) && !node.text.is_empty() {
        return Some(node.text.clone());
    }
    node.children.iter().find_map(first_title_heading)
}

impl BookReader for DocxData {
    fn metadata(&self) -> Metadata {
        let docx = match self.parse() {
            Ok(d) => d,
            Err(_) => {
                return Metadata {
                    title: self.file_stem.clone(),
                    ..Metadata::default()
                }
            }
        };

        let (core_title, creator, language, description) = match &docx.core {
            Some(docx_rust::core::Core::CoreNamespace(c)) => (
                c.title.as_deref().map(|s| s.to_string()),
                c.creator.as_deref().map(|s| s.to_string()),
                c.language.as_deref().map(|s| s.to_string()),
                c.description.as_deref().map(|s| s.to_string()),
            ),
            Some(docx_rust::core::Core::CoreNoNamespace(c)) => (
                c.title.as_deref().map(|s| s.to_string()),
                c.creator.as_deref().map(|s| s.to_string()),
                c.language.as_deref().map(|s| s.to_string()),
                c.description.as_deref().map(|s| s.to_string()),
            ),
            None => (None, None, None, None),
        };

        let company = match &docx.app {
            Some(docx_rust::app::App::AppNoApNamespace(a)) => {
                a.company.as_deref().map(|s| s.to_string())
            }
            Some(docx_rust::app::App::AppWithApNamespace(a)) => {
                a.company.as_deref().map(|s| s.to_string())
            }
            None => None,
        };

        let title = first_title_heading(&docx_tree::docx_to_tree(&docx))
            .or(core_title.filter(|t| !t.trim().is_empty()))
            .or_else(|| self.file_stem.clone());

        Metadata {
            title,
            authors: creator.map(|a| vec![a]).unwrap_or_default(),
            publisher: company,
            language,
            description,
        }
    }

    // The whole body is one unit
    fn units(&self) -> Result<Vec<String>> {
        Ok(vec![DOCUMENT_PART.to_string()])
    }

    fn load_unit(&self, index: usize) -> Result<Node> {
        if index != 0 {
            return Err(Error::Load(format!("No DOCX unit at {}", index)));
        }
        let docx = self.parse()?;
        Ok(docx_tree::docx_to_tree(&docx))
    }

    fn initial_chapter(&self) -> &str {
        "Document"
    }

    fn read_resource(&self, path: &str) -> Result<Vec<u8>> {
        let docx = self.parse()?;
        for (media_path, (_media_type, data)) in &docx.media {
            if media_path == path {
                return Ok(data.to_vec());
            }
        }
        Err(Error::Load(format!("Resource not in package: {}", path)))
    }

    fn images(&self) -> Result<Vec<ImageResource>> {
        let docx = self.parse()?;
        let mut images = Vec::new();

        for (path, (_media_type, data)) in &docx.media {
            images.push(ImageResource {
                original_href: path.clone(),
                data: data.to_vec(),
            });
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_title_heading_depth_first() {
        let tree = Node::container(
            "body",
            vec![
                Node::new("h2", "Subtitle"),
                Node::container("table", vec![Node::new("h1", "Nested Title")]),
                Node::new("h1", "Later Title"),
            ],
        );
        assert_eq!(first_title_heading(&tree).as_deref(), Some("Nested Title"));
        assert_eq!(first_title_heading(&Node::new("p", "text")), None);
    }
}
