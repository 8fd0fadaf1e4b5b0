//! EmbeddedSession: in-process graph session
//!
//! Executes statements directly against a [`MemoryGraph`], no network needed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::statement::Statement;
use crate::store::memory::MemoryGraph;
use crate::store::session::{ExecutionResult, GraphSession, SessionResult};

/// In-process session that wraps a MemoryGraph directly.
///
/// Ideal for tests and dry runs.
pub struct EmbeddedSession {
    store: Arc<RwLock<MemoryGraph>>,
    executed: AtomicUsize,
    checkpoints: AtomicUsize,
}

impl EmbeddedSession {
    /// Create a new EmbeddedSession with a fresh empty graph
    pub fn new() -> Self {
        Self::with_store(Arc::new(RwLock::new(MemoryGraph::new())))
    }

    /// Create an EmbeddedSession wrapping an existing graph
    pub fn with_store(store: Arc<RwLock<MemoryGraph>>) -> Self {
        Self {
            store,
            executed: AtomicUsize::new(0),
            checkpoints: AtomicUsize::new(0),
        }
    }

    /// Get a reference to the underlying graph
    pub fn store(&self) -> &Arc<RwLock<MemoryGraph>> {
        &self.store
    }

    /// Acquire a read lock on the graph.
    pub async fn store_read(&self) -> tokio::sync::RwLockReadGuard<'_, MemoryGraph> {
        self.store.read().await
    }

    /// Acquire a write lock on the graph, for seeding vertices directly.
    pub async fn store_write(&self) -> tokio::sync::RwLockWriteGuard<'_, MemoryGraph> {
        self.store.write().await
    }

    /// Statements executed so far, lookups included.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Relaxed)
    }

    /// Checkpoints requested so far.
    pub fn checkpoints(&self) -> usize {
        self.checkpoints.load(Ordering::Relaxed)
    }
}

impl Default for EmbeddedSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphSession for EmbeddedSession {
    async fn execute(&self, statement: &Statement) -> SessionResult<ExecutionResult> {
        self.executed.fetch_add(1, Ordering::Relaxed);
        let result = self.store.write().await.apply(statement);
        debug!("{} -> succeeded={}", statement, result.succeeded);
        Ok(result)
    }

    async fn checkpoint(&self) -> SessionResult<()> {
        self.checkpoints.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
