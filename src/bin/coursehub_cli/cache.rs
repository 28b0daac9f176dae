#![deny(clippy::all, clippy::pedantic)]

use std::num::NonZeroUsize;

use lru::LruCache;
use serde_json::Value;

pub const DEFAULT_CAPACITY: usize = 64;

/// Responses of `GET` queries keyed by path plus sorted query params.
pub struct QueryCache {
    entries: LruCache<String, Value>,
}

impl QueryCache {
    /// A zero capacity is clamped to one entry.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Params are sorted so the same query in a different order hits the
    /// same entry.
    pub fn key(path: &str, params: &[(&str, String)]) -> String {
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.sort_unstable();
        if pairs.is_empty() {
            return path.to_string();
        }
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: String, value: Value) {
        self.entries.put(key, value);
    }

    /// Drops every entry whose key starts with `prefix`; returns how many.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.entries.pop(key);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
