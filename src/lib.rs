//! Papergraph
//!
//! Loads paper metadata into a property-graph store: papers, journals,
//! authors, organizations, keywords, classification numbers, topics, albums,
//! funds and sensitive entities become vertices; their relations become
//! edges; citations and entity-paper associations are resolved by title in a
//! second pass.
//!
//! # Layout
//!
//! - `model`: vertex kinds, relation kinds, identifiers, attribute values
//! - `normalize`: total cleaning, escaping and splitting of raw cells
//! - `registry` / `dedup`: stable identifiers and once-only vertex emission
//! - `statement`: structured statements and their Cypher / nGQL rendering
//! - `store`: the `GraphSession` capability, an in-process graph, an HTTP session
//! - `batcher`: ordered, batched execution with per-statement failure isolation
//! - `resolver`: second-pass lookup of forward references
//! - `source`: sheet and nested-document readers
//! - `pipeline`: the paper and sensitive-entity loaders
//!
//! ## Example Usage
//!
//! ```rust
//! use papergraph::{
//!     EmbeddedSession, LoadContext, MemorySink, PaperDocument, PaperLoader, PaperRow,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let session = EmbeddedSession::new();
//! let mut context = LoadContext::new();
//! let mut sink = MemorySink::new();
//!
//! let rows = vec![PaperRow::titled("Graph Databases")];
//! let documents = vec![PaperDocument::default()];
//!
//! let report = PaperLoader::new(&mut context, 500)
//!     .run(&session, &rows, &documents, &mut sink)
//!     .await;
//! assert_eq!(report.vertices.failed_count(), 0);
//! assert_eq!(session.store_read().await.vertex_count(), 1);
//! # });
//! ```

#![warn(clippy::all)]

pub mod batcher;
pub mod config;
pub mod dedup;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod statement;
pub mod store;

// Re-export main types for convenience
pub use batcher::{FailedStatement, FlushReport, WriteBatcher};
pub use config::{EntityColumns, LoaderConfig, PaperColumns, StoreConfig, DEFAULT_BATCH_SIZE};
pub use dedup::EntityDeduplicator;
pub use error::{LoaderError, LoaderResult};
pub use model::{EntityKind, PropertyMap, PropertyValue, RelationKind, VertexId};
pub use pipeline::{EntityLoader, EntityRunReport, LoadContext, PaperLoader, PaperRunReport};
pub use registry::IdentifierRegistry;
pub use resolver::{
    DropReason, ReferenceKind, ReferenceResolver, Resolution, ResolutionSummary,
    UnresolvedReference,
};
pub use sink::{DiagnosticSink, FileSink, MemorySink};
pub use source::{EntityRow, PaperDocument, PaperRow, Sheet};
pub use statement::{Dialect, RenderedStatement, Statement};
pub use store::{
    EmbeddedSession, ExecutionResult, GraphSession, MemoryGraph, RemoteSession, SessionError,
    SessionResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
