//! Loader configuration
//!
//! Read from YAML; every field has a default so a partial file (or none at
//! all) is valid. Column defaults are the headers of the exported sheets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{LoaderError, LoaderResult};
use crate::statement::Dialect;

/// Statements per flushed batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Store connection
    pub store: StoreConfig,
    /// Statements per flushed batch
    pub batch_size: usize,
    /// Header names of the paper sheet
    pub columns: PaperColumns,
    /// Header names of the sensitive-entity sheet
    pub entity_columns: EntityColumns,
    /// Append-only report of unresolved references
    pub not_found_log: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            columns: PaperColumns::default(),
            entity_columns: EntityColumns::default(),
            not_found_log: PathBuf::from("not_found_papers.txt"),
        }
    }
}

impl LoaderConfig {
    pub fn from_yaml_str(yaml: &str) -> LoaderResult<Self> {
        let config: LoaderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> LoaderResult<()> {
        if self.batch_size == 0 {
            return Err(LoaderError::Config("batch_size must be at least 1".to_string()));
        }
        if self.store.url.trim().is_empty() {
            return Err(LoaderError::Config("store.url must not be empty".to_string()));
        }
        if self.columns.title.trim().is_empty() {
            return Err(LoaderError::Config("columns.title must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// HTTP base URL of the query endpoint
    pub url: String,
    /// Graph (space) name sent with every statement
    pub graph: String,
    /// Query language of the store
    pub dialect: Dialect,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Statements sent on every checkpoint, e.g. `SUBMIT JOB STATS`
    pub checkpoint: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            graph: "test_paperdata".to_string(),
            dialect: Dialect::Cypher,
            timeout_secs: 30,
            checkpoint: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperColumns {
    pub title: String,
    pub journal: String,
    pub abstract_text: String,
    pub keywords: String,
    pub publish_time: String,
    pub albums: String,
    pub topics: String,
    pub classifications: String,
    pub downloads: String,
    pub pages: String,
    pub citations: String,
}

impl Default for PaperColumns {
    fn default() -> Self {
        Self {
            title: "论文标题".to_string(),
            journal: "期刊名称".to_string(),
            abstract_text: "摘要".to_string(),
            keywords: "关键词".to_string(),
            publish_time: "发表时间".to_string(),
            albums: "专辑".to_string(),
            topics: "专题".to_string(),
            classifications: "分类号".to_string(),
            downloads: "下载量".to_string(),
            pages: "页数".to_string(),
            citations: "引用量".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityColumns {
    pub name: String,
    pub score: String,
    pub related_papers: String,
}

impl Default for EntityColumns {
    fn default() -> Self {
        Self {
            name: "实体".to_string(),
            score: "分数".to_string(),
            related_papers: "关联论文".to_string(),
        }
    }
}
