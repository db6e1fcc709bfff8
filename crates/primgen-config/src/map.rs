//! The flat key → state mapping shared by the whole dependency graph.

use std::collections::BTreeMap;

use primgen_model::LoadState;
use serde::{Deserialize, Serialize};

/// Flattened settings for one generation run.
///
/// Keys are only ever added or overwritten; nothing is removed once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureConfig {
    entries: BTreeMap<String, LoadState>,
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// State stored under `key`, `Optional` when absent.
    pub fn get(&self, key: &str) -> LoadState {
        self.entries.get(key).copied().unwrap_or_default()
    }

    /// Explicit state stored under `key`, if any.
    pub fn explicit(&self, key: &str) -> Option<LoadState> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `state` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, state: LoadState) -> Option<LoadState> {
        self.entries.insert(key.into(), state)
    }

    /// Stores `state` only when `key` has no explicit value yet.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, state: LoadState) -> bool {
        let mut inserted = false;
        self.entries.entry(key.into()).or_insert_with(|| {
            inserted = true;
            state
        });
        inserted
    }

    /// Merges `delta` with insert-if-absent semantics and returns how many
    /// keys were added.
    pub fn absorb(&mut self, delta: BTreeMap<String, LoadState>) -> usize {
        let mut added = 0;
        for (key, state) in delta {
            if self.insert_if_absent(key, state) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LoadState)> {
        self.entries.iter().map(|(key, state)| (key.as_str(), *state))
    }
}

impl FromIterator<(String, LoadState)> for FeatureConfig {
    fn from_iter<I: IntoIterator<Item = (String, LoadState)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
