//! Custom collection types used by the parser.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// A set that remembers insertion order.
///
/// Scope locals are reported in the order they were first bound, while
/// lookups must stay constant time.
#[derive(Debug, Clone)]
pub struct OrderedSet<K> {
    entries: Vec<K>,
    index: FxHashSet<K>,
}

impl<K: Eq + Hash + Copy> OrderedSet<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashSet::default(),
        }
    }

    /// Insert a key, returning `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.insert(key) {
            self.entries.push(key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.entries
    }
}

impl<K: Eq + Hash + Copy> Default for OrderedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
