//! Single-pass segmentation of node trees into reading chunks.

use crate::chapter::{ChapterTracker, TableOfContents};
use crate::chunk::{Chunk, ChunkAccumulator, ChunkFactory};
use crate::node::{Node, NodeKind};
use crate::policy::SegmentationPolicy;

/// Traversal state for one ingestion run.
///
/// Owns the open buffer, the active chapter label and the chunks emitted so
/// far. Feed it units in document order and call [`Segmenter::finish`].
pub struct Segmenter {
    policy: SegmentationPolicy,
    factory: ChunkFactory,
    accumulator: ChunkAccumulator,
    chapter: ChapterTracker,
    chunks: Vec<Chunk>,
}

impl Segmenter {
    pub fn new(policy: SegmentationPolicy, factory: ChunkFactory, initial_chapter: &str) -> Self {
        Self {
            policy,
            factory,
            accumulator: ChunkAccumulator::new(),
            chapter: ChapterTracker::new(initial_chapter),
            chunks: Vec::new(),
        }
    }

    pub fn chapter(&self) -> &str {
        self.chapter.current()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Switch to the label the TOC gives `path`, closing the pending text
    /// under the old label first.
    pub fn begin_unit(&mut self, toc: &dyn TableOfContents, path: &str) {
        if let Some(label) = self.chapter.transition(toc, path) {
            self.flush();
            tracing::debug!(from = self.chapter.current(), to = %label, "Chapter change");
            self.chapter.set(label);
        }
    }

    pub fn traverse(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::Media => {}
            NodeKind::Heading(_) => self.heading(node),
            NodeKind::Paragraph => self.paragraph(node),
            NodeKind::Container | NodeKind::Other => {
                for child in &node.children {
                    self.traverse(child);
                }
            }
        }
    }

    /// Flush whatever is left and hand back the chunk sequence.
    pub fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }

    fn flush(&mut self) {
        if let Some(chunk) = self.accumulator.flush(&mut self.factory, self.chapter.current()) {
            self.chunks.push(chunk);
        }
    }

    fn heading(&mut self, node: &Node) {
        let text = node.text.trim();
        if text.is_empty() {
            return;
        }
        self.flush();
        self.chunks.push(self.factory.header(text));
        self.chapter.set(text);
    }

    fn paragraph(&mut self, node: &Node) {
        let text = node.text.trim();
        if text.is_empty() {
            return;
        }
        let dialogue = self.policy.is_dialogue(text);

        if self
            .policy
            .exceeds_hard(self.accumulator.len(), self.accumulator.appended_len(text))
        {
            self.flush();
        }

        self.accumulator.append(text);

        if self.policy.is_self_contained_paragraph(text, dialogue)
            || self
                .policy
                .should_flush_after_append(self.accumulator.len(), dialogue)
        {
            self.flush();
        }
    }
}
