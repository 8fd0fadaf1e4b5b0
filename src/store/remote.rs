//! RemoteSession: HTTP session for a running graph store
//!
//! Posts rendered statements to `{url}/api/query` and reads
//! `{url}/api/status` when connecting.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::statement::{Dialect, RenderedStatement, Statement};
use crate::store::session::{ExecutionResult, GraphSession, SessionError, SessionResult};

/// Body of a successful `/api/query` response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    records: Vec<Vec<serde_json::Value>>,
}

/// Body of `/api/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    /// Health status (e.g., "healthy")
    pub status: String,
    #[serde(default)]
    pub version: String,
}

/// Network session for a running store.
pub struct RemoteSession {
    http_base_url: String,
    http_client: Client,
    graph: String,
    dialect: Dialect,
    checkpoint_statements: Vec<String>,
}

impl RemoteSession {
    /// Build a session without contacting the store.
    pub fn new(config: &StoreConfig) -> SessionResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http_base_url: config.url.trim_end_matches('/').to_string(),
            http_client,
            graph: config.graph.clone(),
            dialect: config.dialect,
            checkpoint_statements: config.checkpoint.clone(),
        })
    }

    /// Build a session and verify the store answers its status endpoint.
    ///
    /// This is the only store failure that aborts a run.
    pub async fn connect(config: &StoreConfig) -> SessionResult<Self> {
        let session = Self::new(config)?;
        let status = session.status().await?;
        info!(
            "Connected to graph store at {} (status: {}, version: {})",
            session.http_base_url, status.status, status.version
        );
        Ok(session)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub async fn status(&self) -> SessionResult<StoreStatus> {
        let url = format!("{}/api/status", self.http_base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SessionError::Connection(format!("{}: {}", url, e)))?;

        if response.status().is_success() {
            let status: StoreStatus = response.json().await?;
            Ok(status)
        } else {
            Err(SessionError::Connection(format!(
                "Status endpoint returned {}",
                response.status()
            )))
        }
    }

    /// Execute a POST request to /api/query
    async fn post_query(&self, rendered: &RenderedStatement) -> SessionResult<ExecutionResult> {
        let url = format!("{}/api/query", self.http_base_url);
        let body = serde_json::json!({
            "query": rendered.text,
            "params": rendered.params,
            "graph": self.graph,
        });

        let response = self.http_client.post(&url).json(&body).send().await?;

        if response.status().is_success() {
            let result: QueryResponse = response.json().await?;
            Ok(ExecutionResult::rows(result.columns, result.records))
        } else {
            let status = response.status();
            let error_body: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| serde_json::json!({"error": "Unknown error"}));
            let msg = error_body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            Ok(ExecutionResult::failure(format!("{} ({})", msg, status)))
        }
    }
}

#[async_trait]
impl GraphSession for RemoteSession {
    async fn execute(&self, statement: &Statement) -> SessionResult<ExecutionResult> {
        let rendered = statement.render(self.dialect);
        debug!("Executing: {}", rendered.text);
        self.post_query(&rendered).await
    }

    async fn checkpoint(&self) -> SessionResult<()> {
        for text in &self.checkpoint_statements {
            let rendered = RenderedStatement {
                text: text.clone(),
                params: serde_json::Map::new(),
            };
            let result = self.post_query(&rendered).await?;
            if !result.succeeded {
                return Err(SessionError::Query(format!(
                    "checkpoint '{}' failed: {}",
                    text,
                    result.error_message.unwrap_or_default()
                )));
            }
        }
        Ok(())
    }
}
