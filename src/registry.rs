//! Identifier registry
//!
//! Maps `(kind, natural key)` to a stable vertex identifier. Counters are per
//! kind and start at 1; an identifier, once handed out, is never reassigned.
//! Keys are scoped per kind, so a paper titled "Graph" and a keyword "Graph"
//! get distinct identifiers.

use crate::model::{EntityKind, VertexId};
use rustc_hash::FxHashMap;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    ids: FxHashMap<(EntityKind, String), VertexId>,
    next_sequence: HashMap<EntityKind, u64>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for `key`, allocating the next one for `kind` on first sight.
    ///
    /// Callers filter empty keys before calling.
    pub fn resolve(&mut self, kind: EntityKind, key: &str) -> VertexId {
        debug_assert!(!key.is_empty(), "natural keys must be non-empty");
        if let Some(id) = self.ids.get(&(kind, key.to_string())) {
            return id.clone();
        }

        let sequence = self.next_sequence.entry(kind).or_insert(1);
        let id = VertexId::sequenced(kind, *sequence);
        *sequence += 1;
        self.ids.insert((kind, key.to_string()), id.clone());
        id
    }

    /// Previously assigned identifier, without allocating.
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&VertexId> {
        self.ids.get(&(kind, key.to_string()))
    }

    /// Number of identifiers assigned for `kind`.
    pub fn assigned(&self, kind: EntityKind) -> u64 {
        self.next_sequence.get(&kind).map_or(0, |next| next - 1)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
