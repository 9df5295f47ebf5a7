//! Detail-page cache keyed by movie URL.

use cinescrape_core::DetailFields;
use std::collections::{HashMap, VecDeque};

/// Memoizes detail fields per URL for the lifetime of its owner.
///
/// Unbounded by default. A bounded cache evicts the oldest insertion once
/// `max_entries` is reached.
#[derive(Debug, Default)]
pub struct DetailCache {
    entries: HashMap<String, DetailFields>,
    insertion_order: VecDeque<String>,
    max_entries: Option<usize>,
}

impl DetailCache {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    pub fn get(&self, url: &str) -> Option<&DetailFields> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn put(&mut self, url: impl Into<String>, fields: DetailFields) {
        let url = url.into();

        if let Some(existing) = self.entries.get_mut(&url) {
            *existing = fields;
            return;
        }

        if let Some(max) = self.max_entries {
            if max == 0 {
                return;
            }
            while self.entries.len() >= max {
                match self.insertion_order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        self.insertion_order.push_back(url.clone());
        self.entries.insert(url, fields);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
