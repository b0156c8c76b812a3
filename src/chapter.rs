//! Chapter labels for logical units.

/// Lookup of a human-readable label for a document path.
pub trait TableOfContents {
    fn label_for(&self, path: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub href: String,
    pub label: String,
}

/// Flattened table of contents, in navigation order.
#[derive(Debug, Clone, Default)]
pub struct TocIndex {
    entries: Vec<TocEntry>,
}

impl TocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, href: impl Into<String>, label: impl Into<String>) {
        self.entries.push(TocEntry {
            href: href.into(),
            label: label.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TableOfContents for TocIndex {
    /// First entry whose href contains `path`. Entry hrefs usually carry a
    /// fragment (`ch01.xhtml#start`) the unit path lacks.
    fn label_for(&self, path: &str) -> Option<String> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.href.contains(path))
            .map(|e| e.label.trim().to_string())
            .filter(|label| !label.is_empty())
    }
}

/// Tracks the label currently in effect.
#[derive(Debug, Clone)]
pub struct ChapterTracker {
    current: String,
}

impl ChapterTracker {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// The label the unit at `path` switches to, if the TOC names one
    /// other than the active label.
    pub fn transition(&self, toc: &dyn TableOfContents, path: &str) -> Option<String> {
        toc.label_for(path).filter(|label| *label != self.current)
    }

    pub fn set(&mut self, label: impl Into<String>) {
        self.current = label.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toc() -> TocIndex {
        let mut toc = TocIndex::new();
        toc.push("Text/cover.xhtml", "Cover");
        toc.push("Text/ch01.xhtml#start", "  Chapter 1 ");
        toc.push("Text/ch02.xhtml", "");
        toc
    }

    #[test]
    fn test_label_matches_by_substring() {
        let toc = toc();
        assert_eq!(toc.label_for("Text/ch01.xhtml").as_deref(), Some("Chapter 1"));
        assert_eq!(toc.label_for("/Text/cover.xhtml").as_deref(), Some("Cover"));
        assert_eq!(toc.label_for("Text/ch09.xhtml"), None);
        assert_eq!(toc.label_for(""), None);
    }

    #[test]
    fn test_blank_label_is_no_match() {
        assert_eq!(toc().label_for("Text/ch02.xhtml"), None);
    }

    #[test]
    fn test_transition_only_on_change() {
        let toc = toc();
        let mut tracker = ChapterTracker::new("Start");
        let next = tracker.transition(&toc, "Text/ch01.xhtml").unwrap();
        assert_eq!(next, "Chapter 1");
        tracker.set(next);
        assert_eq!(tracker.transition(&toc, "Text/ch01.xhtml"), None);
        assert_eq!(tracker.transition(&toc, "Text/unlisted.xhtml"), None);
        assert_eq!(tracker.current(), "Chapter 1");
    }
}
