use crate::reader::Metadata;
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled Book";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Title and creator stamped on every chunk of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub creator: String,
}

impl BookMetadata {
    pub fn from_metadata(meta: &Metadata) -> Self {
        let title = meta
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
            .to_string();

        let creator = meta
            .authors
            .iter()
            .map(|a| a.trim())
            .find(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string();

        Self { title, creator }
    }
}

pub fn format_metadata(meta: &Metadata) -> String {
    let mut lines = Vec::new();

    if let Some(ref title) = meta.title {
        lines.push(format!("Title: {}", title));
    }

    if !meta.authors.is_empty() {
        lines.push(format!("Author: {}", meta.authors.join(", ")));
    }

    if let Some(ref publisher) = meta.publisher {
        lines.push(format!("Publisher: {}", publisher));
    }

    if let Some(ref language) = meta.language {
        lines.push(format!("Language: {}", language));
    }

    if let Some(ref description) = meta.description {
        let description = description.trim();
        if description.chars().count() > 200 {
            let short: String = description.chars().take(200).collect();
            lines.push(format!("Description: {}...", short));
        } else {
            lines.push(format!("Description: {}", description));
        }
    }

    lines.join("\n")
}
