// src/ingest/dedup.rs
use std::collections::HashSet;

use crate::ingest::types::Item;

pub const MAX_ITEMS_PER_CATEGORY: usize = 10;

/// URL if present, else title. `None` means the item cannot be identified.
pub fn dedup_key(item: &Item) -> Option<String> {
    let url = item.url.trim();
    if !url.is_empty() {
        return Some(url.to_string());
    }
    item.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("title:{t}"))
}

/// Order-preserving accumulator for one category: first occurrence wins,
/// capacity [`MAX_ITEMS_PER_CATEGORY`].
#[derive(Debug, Default)]
pub struct CategoryBucket {
    seen: HashSet<String>,
    items: Vec<Item>,
}

impl CategoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the item was added.
    pub fn push(&mut self, item: Item) -> bool {
        if self.is_full() {
            return false;
        }
        let Some(key) = dedup_key(&item) else {
            return false;
        };
        if !self.seen.insert(key) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS_PER_CATEGORY
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// Stable dedup + truncate to the first [`MAX_ITEMS_PER_CATEGORY`] survivors.
pub fn dedup_and_cap(items: impl IntoIterator<Item = Item>) -> Vec<Item> {
    let mut bucket = CategoryBucket::new();
    for it in items {
        bucket.push(it);
        if bucket.is_full() {
            break;
        }
    }
    bucket.into_items()
}
