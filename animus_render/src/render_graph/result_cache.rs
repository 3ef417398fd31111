/// Per-graph mapping from pass name to its most recently published texture.
///
/// Entries persist across frames until overwritten or invalidated. The graph
/// invalidates an entry whenever its producer rebuilds or releases the
/// texture, so a live entry never names destroyed GPU memory.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::Texture;

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: FxHashMap<String, Texture>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `texture` under `name`, returning the entry it replaced
    pub fn publish(&mut self, name: &str, texture: Texture) -> Option<Texture> {
        self.entries.insert(name.to_string(), texture)
    }

    /// Latest texture published under `name`
    ///
    /// # Errors
    ///
    /// `UnknownResultKey` if nothing is published under `name` (never
    /// published, or invalidated since).
    pub fn get(&self, name: &str) -> Result<Texture> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownResultKey(name.to_string()))
    }

    /// Drop the entry for `name`
    pub fn invalidate(&mut self, name: &str) -> Option<Texture> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Published names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "result_cache_tests.rs"]
mod tests;
