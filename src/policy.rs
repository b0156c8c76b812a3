//! Chunk boundary decisions. Everything here is pure.

use crate::config::ChunkingConfig;
use crate::node::{Node, NodeKind};

/// Marks that identify a short exchange line (dialogue) rather than
/// narrative prose.
///
/// The defaults follow Spanish and English typesetting: lines opened by a
/// dash or a quotation mark, or lead-ins ending in a colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueStyle {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for DialogueStyle {
    fn default() -> Self {
        Self {
            prefixes: ["—", "-", "“", "\""].iter().map(|s| s.to_string()).collect(),
            suffixes: vec![":".to_string()],
        }
    }
}

impl DialogueStyle {
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty()
            && (self.prefixes.iter().any(|p| text.starts_with(p.as_str()))
                || self.suffixes.iter().any(|s| text.ends_with(s.as_str())))
    }
}

#[derive(Debug, Clone)]
pub struct SegmentationPolicy {
    pub soft_limit: usize,
    pub hard_limit: usize,
    pub min_paragraph_length: usize,
    pub dialogue: DialogueStyle,
}

impl SegmentationPolicy {
    pub fn new(config: &ChunkingConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            soft_limit: config.chunk_soft_limit,
            hard_limit: config.chunk_hard_limit,
            min_paragraph_length: config.min_paragraph_length,
            dialogue: DialogueStyle::default(),
        }
    }

    pub fn with_dialogue_style(mut self, style: DialogueStyle) -> Self {
        self.dialogue = style;
        self
    }

    pub fn is_heading(&self, node: &Node) -> bool {
        matches!(node.kind(), NodeKind::Heading(_))
    }

    pub fn is_paragraph_like(&self, node: &Node) -> bool {
        node.kind() == NodeKind::Paragraph
    }

    pub fn is_dialogue(&self, text: &str) -> bool {
        self.dialogue.matches(text)
    }

    pub fn exceeds_hard(&self, current_len: usize, added_len: usize) -> bool {
        current_len + added_len > self.hard_limit
    }

    pub fn should_flush_after_append(&self, new_len: usize, dialogue: bool) -> bool {
        new_len >= self.hard_limit || (!dialogue && new_len >= self.soft_limit)
    }

    /// Long narrative paragraphs close their chunk on their own.
    pub fn is_self_contained_paragraph(&self, text: &str, dialogue: bool) -> bool {
        !dialogue && text.chars().count() >= self.min_paragraph_length
    }
}

impl Default for SegmentationPolicy {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_markers() {
        let policy = SegmentationPolicy::default();
        assert!(policy.is_dialogue("—Hola."));
        assert!(policy.is_dialogue("- Yes."));
        assert!(policy.is_dialogue("“Quiet,” she said."));
        assert!(policy.is_dialogue("\"Run.\""));
        assert!(policy.is_dialogue("He answered:"));
        assert!(!policy.is_dialogue("The night was long."));
        assert!(!policy.is_dialogue(""));
    }

    #[test]
    fn test_custom_dialogue_style() {
        let style = DialogueStyle {
            prefixes: vec!["«".to_string()],
            suffixes: vec![],
        };
        let policy = SegmentationPolicy::default().with_dialogue_style(style);
        assert!(policy.is_dialogue("«Bonjour»"));
        assert!(!policy.is_dialogue("—Hola."));
        assert!(!policy.is_dialogue("Il dit:"));
    }

    #[test]
    fn test_limits() {
        let policy = SegmentationPolicy::default();
        assert!(!policy.exceeds_hard(800, 100));
        assert!(policy.exceeds_hard(800, 101));

        assert!(policy.should_flush_after_append(500, false));
        assert!(!policy.should_flush_after_append(500, true));
        assert!(policy.should_flush_after_append(900, true));
        assert!(!policy.should_flush_after_append(499, false));
    }

    #[test]
    fn test_self_contained_paragraph() {
        let policy = SegmentationPolicy::default();
        let long = "a".repeat(120);
        assert!(policy.is_self_contained_paragraph(&long, false));
        assert!(!policy.is_self_contained_paragraph(&long, true));
        assert!(!policy.is_self_contained_paragraph(&long[..119], false));
    }

    #[test]
    fn test_node_predicates() {
        let policy = SegmentationPolicy::default();
        assert!(policy.is_heading(&Node::new("h3", "Title")));
        assert!(policy.is_paragraph_like(&Node::new("li", "item")));
        assert!(!policy.is_paragraph_like(&Node::new("div", "block")));
    }
}
