//! Reference resolver
//!
//! Second-phase resolution of forward references. Every reference starts
//! unresolved and ends either resolved (both endpoints found by natural key,
//! edge enqueued) or dropped (a lookup found nothing or faulted, pair
//! reported). Lookups take the first match when several vertices share a key.
//!
//! Vertices are never created while references resolve, so lookup hits and
//! misses are memoized for the resolver's lifetime. Faults are not.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, warn};

use crate::batcher::WriteBatcher;
use crate::model::{EntityKind, RelationKind, VertexId};
use crate::sink::{unresolved_block, DiagnosticSink};
use crate::statement::Statement;
use crate::store::{GraphSession, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// paper cites paper
    Citation,
    /// sensitive entity relates to paper
    Association,
}

impl ReferenceKind {
    pub fn citing_kind(&self) -> EntityKind {
        self.relation().endpoints().0
    }

    pub fn target_kind(&self) -> EntityKind {
        self.relation().endpoints().1
    }

    pub fn relation(&self) -> RelationKind {
        match self {
            ReferenceKind::Citation => RelationKind::Reference,
            ReferenceKind::Association => RelationKind::RelatedToPaper,
        }
    }

    /// Heading of a not-found report block, as earlier loads wrote it.
    pub fn heading(&self) -> &'static str {
        match self {
            ReferenceKind::Citation => "论文",
            ReferenceKind::Association => "实体",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DropReason {
    NotFound,
    LookupFailed(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NotFound => write!(f, "not found"),
            DropReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub citing_key: String,
    pub target_key: String,
    pub reason: DropReason,
}

/// Final state of one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { src: VertexId, dst: VertexId },
    Dropped(UnresolvedReference),
    /// Empty target key; never looked up, never reported
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub considered: usize,
    pub resolved: usize,
    pub dropped: usize,
    pub lookup_failures: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

pub struct ReferenceResolver {
    kind: ReferenceKind,
    memo: FxHashMap<(EntityKind, String), Option<VertexId>>,
    summary: ResolutionSummary,
}

impl ReferenceResolver {
    pub fn new(kind: ReferenceKind) -> Self {
        Self {
            kind,
            memo: FxHashMap::default(),
            summary: ResolutionSummary::default(),
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn summary(&self) -> &ResolutionSummary {
        &self.summary
    }

    pub fn into_summary(self) -> ResolutionSummary {
        self.summary
    }

    /// First vertex of `kind` whose key attribute equals `key`.
    async fn find(
        &mut self,
        session: &dyn GraphSession,
        kind: EntityKind,
        key: &str,
    ) -> SessionResult<Option<VertexId>> {
        let memo_key = (kind, key.to_string());
        if let Some(hit) = self.memo.get(&memo_key) {
            return Ok(hit.clone());
        }
        let found = session
            .lookup(kind, kind.key_field(), key)
            .await?
            .into_iter()
            .next();
        self.memo.insert(memo_key, found.clone());
        Ok(found)
    }

    /// Resolve one reference, enqueueing its edge when both endpoints exist.
    pub async fn resolve(
        &mut self,
        session: &dyn GraphSession,
        batcher: &mut WriteBatcher,
        citing_key: &str,
        target_key: &str,
    ) -> Resolution {
        if citing_key.is_empty() || target_key.is_empty() {
            return Resolution::Skipped;
        }
        self.summary.considered += 1;

        let endpoints = match self.find(session, self.kind.citing_kind(), citing_key).await {
            Ok(Some(src)) => match self.find(session, self.kind.target_kind(), target_key).await {
                Ok(Some(dst)) => Ok((src, dst)),
                Ok(None) => Err(DropReason::NotFound),
                Err(e) => Err(DropReason::LookupFailed(e.to_string())),
            },
            Ok(None) => Err(DropReason::NotFound),
            Err(e) => Err(DropReason::LookupFailed(e.to_string())),
        };

        match endpoints {
            Ok((src, dst)) => {
                debug!("Resolved {} -> {} ({} -> {})", citing_key, target_key, src, dst);
                batcher.enqueue(Statement::edge(self.kind.relation(), src.clone(), dst.clone()));
                self.summary.resolved += 1;
                Resolution::Resolved { src, dst }
            }
            Err(reason) => {
                match &reason {
                    DropReason::NotFound => {
                        warn!("Unresolved {:?}: {} -> {}", self.kind, citing_key, target_key)
                    }
                    DropReason::LookupFailed(msg) => {
                        self.summary.lookup_failures += 1;
                        error!(
                            "Lookup failed for {:?} {} -> {}: {}",
                            self.kind, citing_key, target_key, msg
                        )
                    }
                }
                let unresolved = UnresolvedReference {
                    citing_key: citing_key.to_string(),
                    target_key: target_key.to_string(),
                    reason,
                };
                self.summary.dropped += 1;
                self.summary.unresolved.push(unresolved.clone());
                Resolution::Dropped(unresolved)
            }
        }
    }

    /// Resolve every reference of one citing entity and report the dropped
    /// targets to `sink` as a single block.
    pub async fn resolve_all(
        &mut self,
        session: &dyn GraphSession,
        batcher: &mut WriteBatcher,
        sink: &mut dyn DiagnosticSink,
        citing_key: &str,
        target_keys: &[String],
    ) -> Vec<Resolution> {
        let mut resolutions = Vec::with_capacity(target_keys.len());
        let mut missing = Vec::new();
        for target in target_keys {
            let resolution = self.resolve(session, batcher, citing_key, target).await;
            if let Resolution::Dropped(unresolved) = &resolution {
                missing.push(unresolved.target_key.clone());
            }
            resolutions.push(resolution);
        }

        if !missing.is_empty() {
            let block = unresolved_block(self.kind.heading(), citing_key, &missing);
            if let Err(e) = sink.append(&block) {
                error!("Failed to write unresolved references for {}: {}", citing_key, e);
            }
        }
        resolutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyMap;
    use crate::sink::MemorySink;
    use crate::store::{EmbeddedSession, ExecutionResult, SessionError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn papers(titles: &[&str]) -> EmbeddedSession {
        let session = EmbeddedSession::new();
        {
            let mut store = session.store_write().await;
            for (i, title) in titles.iter().enumerate() {
                let mut props = PropertyMap::new();
                props.insert("title".to_string(), (*title).into());
                store.insert_vertex(
                    EntityKind::Paper,
                    VertexId::sequenced(EntityKind::Paper, i as u64 + 1),
                    props,
                );
            }
        }
        session
    }

    #[tokio::test]
    async fn test_citation_resolves() {
        let session = papers(&["A", "B"]).await;
        let mut batcher = WriteBatcher::new(10);
        let mut resolver = ReferenceResolver::new(ReferenceKind::Citation);

        let resolution = resolver.resolve(&session, &mut batcher, "A", "B").await;
        assert_eq!(
            resolution,
            Resolution::Resolved {
                src: VertexId::new("paper01"),
                dst: VertexId::new("paper02"),
            }
        );
        assert_eq!(
            batcher.pending(),
            &[Statement::edge(
                RelationKind::Reference,
                VertexId::new("paper01"),
                VertexId::new("paper02")
            )]
        );
    }

    #[tokio::test]
    async fn test_missing_target_is_reported() {
        let session = papers(&["A"]).await;
        let mut batcher = WriteBatcher::new(10);
        let mut sink = MemorySink::new();
        let mut resolver = ReferenceResolver::new(ReferenceKind::Citation);

        let targets = vec!["Z".to_string(), String::new(), "Y".to_string()];
        let resolutions = resolver
            .resolve_all(&session, &mut batcher, &mut sink, "A", &targets)
            .await;

        assert_eq!(resolutions[1], Resolution::Skipped);
        assert!(batcher.is_empty());
        assert_eq!(sink.contents(), "论文: A\n  - Z\n  - Y\n\n");

        let summary = resolver.summary();
        assert_eq!(summary.considered, 2);
        assert_eq!(summary.dropped, 2);
        assert_eq!(summary.unresolved[0].citing_key, "A");
        assert_eq!(summary.unresolved[0].target_key, "Z");
        assert_eq!(summary.unresolved[0].reason, DropReason::NotFound);
    }

    /// Counts lookups and faults on every title except "A".
    struct FlakySession {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl GraphSession for FlakySession {
        async fn execute(&self, statement: &Statement) -> SessionResult<ExecutionResult> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match statement {
                Statement::Lookup { value, .. } if value == "A" => Ok(ExecutionResult::rows(
                    vec!["vid".to_string()],
                    vec![vec![serde_json::json!("paper01")]],
                )),
                _ => Err(SessionError::Connection("timed out".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_hits_are_memoized_faults_are_not() {
        let session = FlakySession {
            lookups: AtomicUsize::new(0),
        };
        let mut batcher = WriteBatcher::new(10);
        let mut resolver = ReferenceResolver::new(ReferenceKind::Citation);

        let first = resolver.resolve(&session, &mut batcher, "A", "B").await;
        let second = resolver.resolve(&session, &mut batcher, "A", "B").await;
        assert!(matches!(
            first,
            Resolution::Dropped(UnresolvedReference {
                reason: DropReason::LookupFailed(_),
                ..
            })
        ));
        assert_eq!(first, second);
        // "A" looked up once, "B" twice
        assert_eq!(session.lookups.load(Ordering::SeqCst), 3);
        assert_eq!(resolver.summary().lookup_failures, 2);
    }

    #[test]
    fn test_reference_kinds() {
        assert_eq!(ReferenceKind::Citation.citing_kind(), EntityKind::Paper);
        assert_eq!(ReferenceKind::Citation.target_kind(), EntityKind::Paper);
        assert_eq!(ReferenceKind::Association.citing_kind(), EntityKind::SensitiveEntity);
        assert_eq!(ReferenceKind::Association.relation(), RelationKind::RelatedToPaper);
        assert_eq!(ReferenceKind::Association.heading(), "实体");
    }
}
