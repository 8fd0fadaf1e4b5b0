//! GraphSession trait: the store-access capability the loaders consume

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{EntityKind, VertexId};
use crate::statement::{Statement, VID_FIELD};

/// Faults raised while talking to a store.
///
/// A statement the store evaluates and rejects is not a fault: it comes back
/// as an [`ExecutionResult`] with `succeeded == false`.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Query rejected where a result was required
    #[error("Query error: {0}")]
    Query(String),

    /// Connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Outcome of one executed statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub succeeded: bool,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub records: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ExecutionResult {
    /// Successful result without rows
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            ..Self::default()
        }
    }

    pub fn rows(columns: Vec<String>, records: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            succeeded: true,
            columns,
            records,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of column `name`, in row order.
    pub fn column_values(&self, name: &str) -> Vec<&serde_json::Value> {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => self.records.iter().filter_map(|row| row.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Vertex identifiers yielded by a lookup: the `vid` column, or the first
    /// column when the store names it differently.
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        let idx = self.columns.iter().position(|c| c == VID_FIELD).unwrap_or(0);
        self.records
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(|value| match value {
                serde_json::Value::String(s) => Some(VertexId::new(s.as_str())),
                serde_json::Value::Null => None,
                other => Some(VertexId::new(other.to_string())),
            })
            .collect()
    }
}

/// Store-access capability.
///
/// Implemented by:
/// - `EmbeddedSession`: in-process [`MemoryGraph`](super::MemoryGraph)
/// - `RemoteSession`: HTTP query endpoint
///
/// Callers await every call before issuing the next one; the loaders never
/// keep two store operations in flight.
#[async_trait]
pub trait GraphSession: Send + Sync {
    /// Execute one statement.
    async fn execute(&self, statement: &Statement) -> SessionResult<ExecutionResult>;

    /// Identifiers of vertices of `kind` whose `field` equals `value`, in the
    /// order the store returns them.
    async fn lookup(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> SessionResult<Vec<VertexId>> {
        let statement = Statement::Lookup {
            kind,
            field: field.to_string(),
            value: value.to_string(),
        };
        let result = self.execute(&statement).await?;
        if !result.succeeded {
            return Err(SessionError::Query(
                result.error_message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }
        Ok(result.vertex_ids())
    }

    /// Ask the store to commit and refresh statistics.
    async fn checkpoint(&self) -> SessionResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vertex_ids_prefers_vid_column() {
        let result = ExecutionResult::rows(
            vec!["title".into(), "vid".into()],
            vec![vec![json!("A"), json!("paper01")], vec![json!("A"), json!("paper09")]],
        );
        assert_eq!(result.vertex_ids(), vec![VertexId::new("paper01"), VertexId::new("paper09")]);
        assert_eq!(result.column_values("title").len(), 2);
        assert!(result.column_values("missing").is_empty());
    }

    #[test]
    fn test_vertex_ids_falls_back_to_first_column() {
        let result = ExecutionResult::rows(
            vec!["id(VERTEX)".into()],
            vec![vec![json!("paper03")], vec![json!(null)]],
        );
        assert_eq!(result.vertex_ids(), vec![VertexId::new("paper03")]);
    }

    #[test]
    fn test_failure_result() {
        let result = ExecutionResult::failure("SemanticError");
        assert!(!result.succeeded);
        assert!(result.is_empty());
        assert_eq!(result.error_message.as_deref(), Some("SemanticError"));
    }
}
