//! Sensitive-entity loader
//!
//! Phase 1 materializes one `sensitive_entity` vertex per distinct name.
//! Phase 2 links each entity to the papers its row names, looking papers up
//! by title.

use serde::Serialize;
use tracing::{info, warn};

use super::LoadContext;
use crate::batcher::{FlushReport, WriteBatcher};
use crate::model::{EntityKind, PropertyMap};
use crate::normalize::{clean_scalar, coerce_int, split_related_titles};
use crate::resolver::{ReferenceKind, ReferenceResolver, ResolutionSummary};
use crate::sink::DiagnosticSink;
use crate::source::EntityRow;
use crate::statement::Statement;
use crate::store::GraphSession;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityStageSummary {
    pub rows: usize,
    pub skipped_rows: usize,
    pub vertex_statements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityRunReport {
    pub stage: EntityStageSummary,
    pub vertices: FlushReport,
    pub associations: FlushReport,
    pub resolution: ResolutionSummary,
}

pub struct EntityLoader<'ctx> {
    context: &'ctx mut LoadContext,
    batcher: WriteBatcher,
}

impl<'ctx> EntityLoader<'ctx> {
    pub fn new(context: &'ctx mut LoadContext, batch_size: usize) -> Self {
        Self {
            context,
            batcher: WriteBatcher::new(batch_size),
        }
    }

    pub fn pending(&self) -> &[Statement] {
        self.batcher.pending()
    }

    pub fn take_pending(&mut self) -> Vec<Statement> {
        self.batcher.drain()
    }

    pub fn stage(&mut self, rows: &[EntityRow]) -> EntityStageSummary {
        let queued_before = self.batcher.len();
        let mut summary = EntityStageSummary::default();

        for (idx, row) in rows.iter().enumerate() {
            let name = clean_scalar(row.name.as_deref());
            if name.is_empty() {
                warn!("Skipping entity row {}: empty name", idx);
                summary.skipped_rows += 1;
                continue;
            }
            let sensitive = coerce_int(row.score.as_deref());
            self.context
                .materialize(&mut self.batcher, EntityKind::SensitiveEntity, &name, || {
                    let mut properties = PropertyMap::new();
                    properties.insert("entity_name".to_string(), name.as_str().into());
                    properties.insert("sensitive".to_string(), sensitive.into());
                    properties
                });
            summary.rows += 1;
        }

        summary.vertex_statements = self.batcher.len() - queued_before;
        summary
    }

    pub async fn run(
        &mut self,
        session: &dyn GraphSession,
        rows: &[EntityRow],
        sink: &mut dyn DiagnosticSink,
    ) -> EntityRunReport {
        info!("Materializing {} sensitive entities", rows.len());
        let stage = self.stage(rows);
        let vertices = self.batcher.flush_all(session).await;
        info!(
            "Sensitive entities loaded: {} statements, {} failed",
            vertices.executed,
            vertices.failed_count()
        );

        let mut resolver = ReferenceResolver::new(ReferenceKind::Association);
        for row in rows {
            let name = clean_scalar(row.name.as_deref());
            if name.is_empty() {
                continue;
            }
            let titles = split_related_titles(row.related_papers.as_deref());
            if titles.is_empty() {
                continue;
            }
            resolver
                .resolve_all(session, &mut self.batcher, sink, &name, &titles)
                .await;
        }
        let resolution = resolver.into_summary();
        let associations = self.batcher.flush_all(session).await;
        info!(
            "Entity associations loaded: {} resolved, {} unresolved, {} failed",
            resolution.resolved,
            resolution.dropped,
            associations.failed_count()
        );

        EntityRunReport {
            stage,
            vertices,
            associations,
            resolution,
        }
    }
}
