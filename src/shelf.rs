//! Shelf entries and the pure operations on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one shelved book. The chunk payload lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub total_chunks: usize,
    #[serde(default)]
    pub last_read_index: usize,
    /// Chunk ids, in the order they were bookmarked.
    #[serde(default)]
    pub bookmarks: Vec<String>,
    pub order: i64,
    pub added_at: DateTime<Utc>,
}

impl BookRecord {
    /// Add `chunk_id` if absent, remove it if present.
    pub fn toggle_bookmark(&mut self, chunk_id: &str) -> &[String] {
        dedup_in_place(&mut self.bookmarks);
        if let Some(pos) = self.bookmarks.iter().position(|b| b == chunk_id) {
            self.bookmarks.remove(pos);
        } else {
            self.bookmarks.push(chunk_id.to_string());
        }
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, chunk_id: &str) -> bool {
        self.bookmarks.iter().any(|b| b == chunk_id)
    }
}

fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("expected 'up' or 'down', got '{}'", other)),
        }
    }
}

/// Order value for a book appended to `shelf`.
pub fn next_order(shelf: &[BookRecord]) -> i64 {
    shelf.iter().map(|b| b.order).max().map_or(0, |max| max + 1)
}

/// Sort by display position.
pub fn sort_by_order(shelf: &mut [BookRecord]) {
    shelf.sort_by_key(|b| b.order);
}

/// Swap `id`'s order with its neighbor in display order.
///
/// Returns false when the book is missing or already at that end.
pub fn swap_with_neighbor(shelf: &mut [BookRecord], id: &str, direction: Direction) -> bool {
    sort_by_order(shelf);
    let Some(index) = shelf.iter().position(|b| b.id == id) else {
        return false;
    };
    let neighbor = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < shelf.len() => index + 1,
        _ => return false,
    };

    let order = shelf[index].order;
    shelf[index].order = shelf[neighbor].order;
    shelf[neighbor].order = order;
    sort_by_order(shelf);
    true
}
