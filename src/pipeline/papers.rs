//! Paper loader
//!
//! Per row, phase 1 enqueues in this order: the paper vertex, its journal,
//! funds, authors with their organizations, keywords, classification
//! numbers, topics, albums. Each entity's vertex precedes the edges naming
//! it. Phase 2 resolves the citations of every row's document.

use serde::Serialize;
use tracing::{info, warn};

use super::LoadContext;
use crate::batcher::{FlushReport, WriteBatcher};
use crate::model::{EntityKind, PropertyMap, PropertyValue, RelationKind, VertexId};
use crate::normalize::{clean_scalar, clean_text, coerce_int, extract_number, split_list};
use crate::resolver::{ReferenceKind, ReferenceResolver, ResolutionSummary};
use crate::sink::DiagnosticSink;
use crate::source::{join_rows, PaperDocument, PaperRow};
use crate::statement::Statement;
use crate::store::GraphSession;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaperStageSummary {
    pub rows: usize,
    pub skipped_rows: usize,
    pub vertex_statements: usize,
    pub edge_statements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaperRunReport {
    pub stage: PaperStageSummary,
    pub vertices: FlushReport,
    pub references: FlushReport,
    pub resolution: ResolutionSummary,
}

pub struct PaperLoader<'ctx> {
    context: &'ctx mut LoadContext,
    batcher: WriteBatcher,
}

impl<'ctx> PaperLoader<'ctx> {
    pub fn new(context: &'ctx mut LoadContext, batch_size: usize) -> Self {
        Self {
            context,
            batcher: WriteBatcher::new(batch_size),
        }
    }

    /// Statements staged and not yet flushed.
    pub fn pending(&self) -> &[Statement] {
        self.batcher.pending()
    }

    pub fn take_pending(&mut self) -> Vec<Statement> {
        self.batcher.drain()
    }

    /// Enqueue the phase-1 statements of every joined row.
    pub fn stage(&mut self, rows: &[PaperRow], documents: &[PaperDocument]) -> PaperStageSummary {
        let queued_before = self.batcher.len();
        let mut summary = PaperStageSummary::default();

        for (idx, (row, document)) in join_rows(rows, documents).enumerate() {
            let title = clean_scalar(row.title.as_deref());
            if title.is_empty() {
                warn!("Skipping paper row {}: empty title", idx);
                summary.skipped_rows += 1;
                continue;
            }
            self.stage_row(&title, row, document);
            summary.rows += 1;
        }

        let staged = &self.batcher.pending()[queued_before..];
        summary.vertex_statements = staged.iter().filter(|s| s.is_vertex()).count();
        summary.edge_statements = staged.iter().filter(|s| s.is_edge()).count();
        summary
    }

    fn stage_row(&mut self, title: &str, row: &PaperRow, document: &PaperDocument) {
        let ctx = &mut *self.context;
        let batcher = &mut self.batcher;

        let paper = ctx.materialize(batcher, EntityKind::Paper, title, || {
            paper_properties(title, row)
        });

        let journal = clean_scalar(row.journal.as_deref());
        if !journal.is_empty() {
            let id = ctx.materialize_named(batcher, EntityKind::Journal, &journal);
            batcher.enqueue(Statement::edge(RelationKind::PaperJournal, paper.clone(), id));
        }

        for fund in &document.funds {
            let name = clean_scalar(fund.name.as_deref());
            if name.is_empty() {
                continue;
            }
            let number = clean_scalar(fund.number.as_deref());
            let id = ctx.materialize(batcher, EntityKind::Fund, &name, || {
                let mut properties = PropertyMap::new();
                properties.insert("name".to_string(), name.as_str().into());
                properties.insert("fund_number".to_string(), number.into());
                properties
            });
            batcher.enqueue(Statement::edge(RelationKind::PaperFund, paper.clone(), id));
        }

        for author in &document.authors {
            let name = clean_scalar(author.name.as_deref());
            let author_id = if name.is_empty() {
                None
            } else {
                let id = ctx.materialize_named(batcher, EntityKind::Author, &name);
                batcher.enqueue(Statement::edge(
                    RelationKind::PaperAuthor,
                    paper.clone(),
                    id.clone(),
                ));
                Some(id)
            };

            for affiliation in &author.affiliations {
                let org = clean_scalar(Some(affiliation));
                if org.is_empty() {
                    continue;
                }
                let org_id = ctx.materialize_named(batcher, EntityKind::Organization, &org);
                batcher.enqueue(Statement::edge(
                    RelationKind::PaperOrganization,
                    paper.clone(),
                    org_id.clone(),
                ));
                if let Some(author_id) = &author_id {
                    batcher.enqueue(Statement::edge(
                        RelationKind::TakingOffice,
                        author_id.clone(),
                        org_id,
                    ));
                }
            }
        }

        let listed = [
            (row.keywords.as_deref(), EntityKind::Keyword, RelationKind::PaperKeyword),
            (
                row.classifications.as_deref(),
                EntityKind::Classification,
                RelationKind::PaperClassification,
            ),
            (row.topics.as_deref(), EntityKind::Topic, RelationKind::PaperTopic),
            (row.albums.as_deref(), EntityKind::Album, RelationKind::PaperAlbum),
        ];
        for (cell, kind, relation) in listed {
            for name in split_list(cell) {
                let name = clean_scalar(Some(&name));
                if name.is_empty() {
                    continue;
                }
                let id = ctx.materialize_named(batcher, kind, &name);
                batcher.enqueue(Statement::edge(relation, paper.clone(), id));
            }
        }
    }

    /// Load rows and documents: stage and flush vertices, then resolve and
    /// flush citations. Dropped citations are written to `sink`.
    pub async fn run(
        &mut self,
        session: &dyn GraphSession,
        rows: &[PaperRow],
        documents: &[PaperDocument],
        sink: &mut dyn DiagnosticSink,
    ) -> PaperRunReport {
        info!("Materializing {} paper rows", rows.len());
        let stage = self.stage(rows, documents);
        let vertices = self.batcher.flush_all(session).await;
        info!(
            "Paper metadata loaded: {} statements, {} failed",
            vertices.executed,
            vertices.failed_count()
        );

        let resolution = self.resolve_citations(session, rows, documents, sink).await;
        let references = self.batcher.flush_all(session).await;
        info!(
            "Citations loaded: {} resolved, {} unresolved, {} failed",
            resolution.resolved,
            resolution.dropped,
            references.failed_count()
        );

        PaperRunReport {
            stage,
            vertices,
            references,
            resolution,
        }
    }

    async fn resolve_citations(
        &mut self,
        session: &dyn GraphSession,
        rows: &[PaperRow],
        documents: &[PaperDocument],
        sink: &mut dyn DiagnosticSink,
    ) -> ResolutionSummary {
        let mut resolver = ReferenceResolver::new(ReferenceKind::Citation);
        for (row, document) in rows.iter().zip(documents) {
            let citing = clean_scalar(row.title.as_deref());
            if citing.is_empty() {
                continue;
            }
            let targets: Vec<String> = document
                .reference_titles()
                .map(|title| clean_scalar(Some(title)))
                .filter(|title| !title.is_empty())
                .collect();
            if targets.is_empty() {
                continue;
            }
            resolver
                .resolve_all(session, &mut self.batcher, sink, &citing, &targets)
                .await;
        }
        resolver.into_summary()
    }

    /// Identifier assigned to a paper title in this run.
    pub fn paper_id(&self, title: &str) -> Option<&VertexId> {
        self.context.registry.get(EntityKind::Paper, title)
    }
}

fn paper_properties(title: &str, row: &PaperRow) -> PropertyMap {
    let mut properties = PropertyMap::new();
    properties.insert("title".to_string(), title.into());
    properties.insert(
        "abstract".to_string(),
        PropertyValue::Text(clean_text(&clean_scalar(row.abstract_text.as_deref()))),
    );
    properties.insert(
        "release_time".to_string(),
        clean_scalar(row.publish_time.as_deref()).into(),
    );
    properties.insert(
        "download_times".to_string(),
        coerce_int(row.downloads.as_deref()).into(),
    );
    properties.insert("page".to_string(), extract_number(row.pages.as_deref()).into());
    properties.insert(
        "quote_times".to_string(),
        coerce_int(row.citations.as_deref()).into(),
    );
    properties
}
