//! Entity deduplication
//!
//! One set per entity kind recording which natural keys already had their
//! vertex statement emitted in this run. Gating emission here keeps the
//! registry free to be consulted any number of times.

use crate::model::EntityKind;
use rustc_hash::FxHashSet;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EntityDeduplicator {
    inserted: HashMap<EntityKind, FxHashSet<String>>,
}

impl EntityDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_inserted(&self, kind: EntityKind, key: &str) -> bool {
        self.inserted
            .get(&kind)
            .is_some_and(|keys| keys.contains(key))
    }

    pub fn mark_inserted(&mut self, kind: EntityKind, key: &str) {
        self.inserted.entry(kind).or_default().insert(key.to_string());
    }

    /// Mark `key` and report whether it was new.
    pub fn insert_if_new(&mut self, kind: EntityKind, key: &str) -> bool {
        if self.already_inserted(kind, key) {
            return false;
        }
        self.mark_inserted(kind, key);
        true
    }

    /// Number of keys marked for `kind`.
    pub fn inserted(&self, kind: EntityKind) -> usize {
        self.inserted.get(&kind).map_or(0, |keys| keys.len())
    }
}
