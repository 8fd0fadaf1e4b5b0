//! Two-phase loaders
//!
//! Phase 1 materializes vertices and the edges between entities known from
//! the row itself, then flushes. Phase 2 resolves forward references by
//! lookup against the committed vertices, then flushes again.
//!
//! Both loaders borrow one [`LoadContext`], so identifiers and the
//! emitted-vertex sets span every source loaded in a process.

pub mod entities;
pub mod papers;

pub use entities::{EntityLoader, EntityRunReport, EntityStageSummary};
pub use papers::{PaperLoader, PaperRunReport, PaperStageSummary};

use crate::batcher::WriteBatcher;
use crate::dedup::EntityDeduplicator;
use crate::model::{EntityKind, PropertyMap, VertexId};
use crate::registry::IdentifierRegistry;
use crate::statement::Statement;

/// Per-run identifier and deduplication state.
#[derive(Debug, Default)]
pub struct LoadContext {
    pub registry: IdentifierRegistry,
    pub dedup: EntityDeduplicator,
}

impl LoadContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for `key`. The vertex statement is enqueued the first time
    /// the key is seen, before the caller can enqueue any edge naming it.
    pub fn materialize<F>(
        &mut self,
        batcher: &mut WriteBatcher,
        kind: EntityKind,
        key: &str,
        properties: F,
    ) -> VertexId
    where
        F: FnOnce() -> PropertyMap,
    {
        let id = self.registry.resolve(kind, key);
        if self.dedup.insert_if_new(kind, key) {
            batcher.enqueue(Statement::vertex(kind, id.clone(), properties()));
        }
        id
    }

    /// [`materialize`](Self::materialize) for kinds whose only attribute is
    /// their key.
    pub fn materialize_named(
        &mut self,
        batcher: &mut WriteBatcher,
        kind: EntityKind,
        name: &str,
    ) -> VertexId {
        self.materialize(batcher, kind, name, || {
            let mut properties = PropertyMap::new();
            properties.insert(kind.key_field().to_string(), name.into());
            properties
        })
    }
}
