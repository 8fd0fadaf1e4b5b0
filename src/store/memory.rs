//! In-memory property graph
//!
//! A small store with the write semantics the loaders rely on: vertex and
//! edge inserts are idempotent, and edges require both endpoints to exist.
//! Used by the embedded session for tests and dry runs.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{EntityKind, PropertyMap, PropertyValue, RelationKind, VertexId};
use crate::statement::{Statement, VID_FIELD};
use crate::store::session::ExecutionResult;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum MemoryGraphError {
    #[error("Invalid edge: source vertex {0} does not exist")]
    InvalidEdgeSource(VertexId),

    #[error("Invalid edge: target vertex {0} does not exist")]
    InvalidEdgeTarget(VertexId),
}

pub type MemoryGraphResult<T> = Result<T, MemoryGraphError>;

/// Stored vertex
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: EntityKind,
    pub properties: PropertyMap,
}

/// Stored edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub relation: RelationKind,
    pub src: VertexId,
    pub dst: VertexId,
}

/// In-memory graph storage
///
/// - vertices: VertexId -> Vertex, in insertion order
/// - kind_index: EntityKind -> [VertexId]
/// - value_index: (kind, field) -> string value -> [VertexId], for lookups
/// - edges: insertion-ordered edge set
#[derive(Debug, Default)]
pub struct MemoryGraph {
    vertices: IndexMap<VertexId, Vertex>,
    kind_index: HashMap<EntityKind, Vec<VertexId>>,
    value_index: HashMap<(EntityKind, String), HashMap<String, Vec<VertexId>>>,
    edges: IndexSet<EdgeKey>,
}

impl MemoryGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex unless `id` exists. Returns whether it was inserted.
    pub fn insert_vertex(
        &mut self,
        kind: EntityKind,
        id: VertexId,
        properties: PropertyMap,
    ) -> bool {
        if self.vertices.contains_key(&id) {
            return false;
        }

        for (field, value) in &properties {
            if let Some(s) = value.as_string() {
                self.value_index
                    .entry((kind, field.clone()))
                    .or_default()
                    .entry(s.to_string())
                    .or_default()
                    .push(id.clone());
            }
        }
        self.kind_index.entry(kind).or_default().push(id.clone());
        self.vertices.insert(id.clone(), Vertex { id, kind, properties });
        true
    }

    /// Insert an edge unless it exists. Returns whether it was inserted.
    pub fn insert_edge(
        &mut self,
        relation: RelationKind,
        src: VertexId,
        dst: VertexId,
    ) -> MemoryGraphResult<bool> {
        if !self.vertices.contains_key(&src) {
            return Err(MemoryGraphError::InvalidEdgeSource(src));
        }
        if !self.vertices.contains_key(&dst) {
            return Err(MemoryGraphError::InvalidEdgeTarget(dst));
        }
        Ok(self.edges.insert(EdgeKey { relation, src, dst }))
    }

    pub fn get_vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn has_vertex(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn has_edge(&self, relation: RelationKind, src: &VertexId, dst: &VertexId) -> bool {
        self.edges.contains(&EdgeKey {
            relation,
            src: src.clone(),
            dst: dst.clone(),
        })
    }

    /// Vertices of `kind` whose string attribute `field` equals `value`, in
    /// insertion order.
    pub fn find_by_field(&self, kind: EntityKind, field: &str, value: &str) -> Vec<&VertexId> {
        self.value_index
            .get(&(kind, field.to_string()))
            .and_then(|values| values.get(value))
            .map(|ids| ids.iter().collect())
            .unwrap_or_default()
    }

    pub fn vertices_by_kind(&self, kind: EntityKind) -> Vec<&Vertex> {
        self.kind_index
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|id| self.vertices.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn edges_by_relation(&self, relation: RelationKind) -> Vec<&EdgeKey> {
        self.edges.iter().filter(|e| e.relation == relation).collect()
    }

    pub fn outgoing(&self, src: &VertexId) -> Vec<&EdgeKey> {
        self.edges.iter().filter(|e| &e.src == src).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Apply a statement the way a remote store would answer it.
    pub fn apply(&mut self, statement: &Statement) -> ExecutionResult {
        match statement {
            Statement::UpsertVertex { kind, id, properties } => {
                self.insert_vertex(*kind, id.clone(), properties.clone());
                ExecutionResult::ok()
            }
            Statement::UpsertEdge { relation, src, dst } => {
                match self.insert_edge(*relation, src.clone(), dst.clone()) {
                    Ok(_) => ExecutionResult::ok(),
                    Err(e) => ExecutionResult::failure(e.to_string()),
                }
            }
            Statement::Lookup { kind, field, value } => {
                let records = self
                    .find_by_field(*kind, field, value)
                    .into_iter()
                    .map(|id| vec![serde_json::Value::String(id.as_str().to_string())])
                    .collect();
                ExecutionResult::rows(vec![VID_FIELD.to_string()], records)
            }
        }
    }

    /// Integer attribute of a vertex, for assertions in callers.
    pub fn integer_property(&self, id: &VertexId, field: &str) -> Option<i64> {
        self.vertices
            .get(id)
            .and_then(|v| v.properties.get(field))
            .and_then(PropertyValue::as_integer)
    }
}
