//! Generic document tree handed over by the loaders.

/// One element of a loaded document.
///
/// `text` is the element's full text content (descendants included),
/// whitespace-collapsed and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub tag: String,
    pub text: String,
    pub children: Vec<Node>,
}

/// What the segmenter does with a node, resolved once from its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `h1`..`h6`
    Heading(u8),
    /// `p`, `li`, `blockquote`
    Paragraph,
    /// Images, embedded graphics and players. Never contributes text.
    Media,
    /// `div`, `section`, `article`, `body`
    Container,
    Other,
}

impl NodeKind {
    pub fn classify(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        match tag.as_str() {
            "img" | "image" | "svg" | "video" | "audio" | "iframe" => NodeKind::Media,
            "p" | "li" | "blockquote" => NodeKind::Paragraph,
            "div" | "section" | "article" | "body" => NodeKind::Container,
            _ => heading_level(&tag).map_or(NodeKind::Other, NodeKind::Heading),
        }
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

impl Node {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into().trim().to_string(),
            children: Vec::new(),
        }
    }

    /// A node whose text is the concatenation of its children's.
    pub fn container(tag: impl Into<String>, children: Vec<Node>) -> Self {
        let text = children
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            tag: tag.into(),
            text,
            children,
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::classify(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_headings() {
        assert_eq!(NodeKind::classify("h1"), NodeKind::Heading(1));
        assert_eq!(NodeKind::classify("H6"), NodeKind::Heading(6));
        assert_eq!(NodeKind::classify("h7"), NodeKind::Other);
        assert_eq!(NodeKind::classify("hr"), NodeKind::Other);
        assert_eq!(NodeKind::classify("header"), NodeKind::Other);
    }

    #[test]
    fn test_classify_blocks() {
        assert_eq!(NodeKind::classify("P"), NodeKind::Paragraph);
        assert_eq!(NodeKind::classify("blockquote"), NodeKind::Paragraph);
        assert_eq!(NodeKind::classify("section"), NodeKind::Container);
        assert_eq!(NodeKind::classify("svg"), NodeKind::Media);
        assert_eq!(NodeKind::classify("table"), NodeKind::Other);
    }

    #[test]
    fn test_container_text_joins_children() {
        let node = Node::container("div", vec![Node::new("p", " one "), Node::new("p", ""), Node::new("p", "two")]);
        assert_eq!(node.text, "one two");
        assert_eq!(node.children.len(), 3);
    }
}
