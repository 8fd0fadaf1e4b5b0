//! Paper graph data model
//!
//! - Vertex kinds with their tags, identifier prefixes and key attributes
//! - Relation kinds with their edge types and endpoint kinds
//! - Ordered attribute maps for vertex statements

pub mod property;
pub mod types;

pub use property::{PropertyMap, PropertyValue};
pub use types::{EntityKind, RelationKind, VertexId};
