use async_trait::async_trait;
use papergraph::source::{AuthorEntry, FundEntry, ReferenceEntry};
use papergraph::{
    EmbeddedSession, EntityKind, EntityLoader, EntityRow, ExecutionResult, GraphSession,
    LoadContext, MemorySink, PaperDocument, PaperLoader, PaperRow, RelationKind, SessionResult,
    Statement, VertexId,
};

fn paper(title: &str, journal: &str, keywords: &str) -> PaperRow {
    PaperRow {
        title: Some(title.to_string()),
        journal: Some(journal.to_string()),
        keywords: Some(keywords.to_string()),
        downloads: Some("100".to_string()),
        pages: Some("12".to_string()),
        citations: Some("3".to_string()),
        ..PaperRow::default()
    }
}

fn document(authors: &[(&str, &[&str])], references: &[&str]) -> PaperDocument {
    PaperDocument {
        title: None,
        authors: authors
            .iter()
            .map(|(name, orgs)| AuthorEntry {
                name: Some(name.to_string()),
                affiliations: orgs.iter().map(|o| o.to_string()).collect(),
            })
            .collect(),
        funds: vec![FundEntry {
            name: Some("国家自然科学基金".to_string()),
            number: Some("61772".to_string()),
        }],
        references: references
            .iter()
            .map(|t| ReferenceEntry {
                title: Some(t.to_string()),
            })
            .collect(),
    }
}

fn corpus() -> (Vec<PaperRow>, Vec<PaperDocument>) {
    let rows = vec![
        paper("A", "计算机学报", "图；数据库"),
        paper("B", "计算机学报", "数据库、索引"),
    ];
    let documents = vec![
        document(&[("张三", &["清华大学"]), ("李四", &["北京大学"])], &["B", "Z"]),
        document(&[("张三", &["清华大学"])], &["A"]),
    ];
    (rows, documents)
}

fn id(s: &str) -> VertexId {
    VertexId::new(s)
}

#[tokio::test]
async fn test_paper_load_end_to_end() {
    let (rows, documents) = corpus();
    let session = EmbeddedSession::new();
    let mut context = LoadContext::new();
    let mut sink = MemorySink::new();

    let report = PaperLoader::new(&mut context, 500)
        .run(&session, &rows, &documents, &mut sink)
        .await;

    assert_eq!(report.stage.rows, 2);
    assert_eq!(report.vertices.failed_count(), 0);
    assert_eq!(report.references.failed_count(), 0);
    assert_eq!(report.resolution.considered, 3);
    assert_eq!(report.resolution.resolved, 2);
    assert_eq!(report.resolution.dropped, 1);
    assert_eq!(sink.contents(), "论文: A\n  - Z\n\n");

    let store = session.store_read().await;
    assert_eq!(store.vertices_by_kind(EntityKind::Paper).len(), 2);
    assert_eq!(store.vertices_by_kind(EntityKind::Journal).len(), 1);
    assert_eq!(store.vertices_by_kind(EntityKind::Author).len(), 2);
    assert_eq!(store.vertices_by_kind(EntityKind::Organization).len(), 2);
    assert_eq!(store.vertices_by_kind(EntityKind::Keyword).len(), 3);
    assert_eq!(store.vertices_by_kind(EntityKind::Fund).len(), 1);

    assert!(store.has_edge(RelationKind::Reference, &id("paper01"), &id("paper02")));
    assert!(store.has_edge(RelationKind::Reference, &id("paper02"), &id("paper01")));
    assert!(store.has_edge(RelationKind::TakingOffice, &id("author01"), &id("organization01")));
    assert!(store.has_edge(RelationKind::PaperJournal, &id("paper02"), &id("journal01")));
    assert_eq!(store.integer_property(&id("paper01"), "download_times"), Some(100));

    // Two flushes per phase, one batch each
    assert_eq!(session.checkpoints(), 2);
}

#[tokio::test]
async fn test_dedup_idempotence() {
    let rows: Vec<PaperRow> = (0..5)
        .map(|i| paper(&format!("P{}", i), "同一期刊", "同一关键词"))
        .collect();
    let documents: Vec<PaperDocument> = (0..5)
        .map(|_| document(&[("王五", &["同一单位"])], &[]))
        .collect();

    let mut context = LoadContext::new();
    let mut loader = PaperLoader::new(&mut context, 500);
    loader.stage(&rows, &documents);

    let vertex_count = |kind: EntityKind| {
        loader
            .pending()
            .iter()
            .filter(|s| matches!(s, Statement::UpsertVertex { kind: k, .. } if *k == kind))
            .count()
    };
    assert_eq!(vertex_count(EntityKind::Paper), 5);
    assert_eq!(vertex_count(EntityKind::Journal), 1);
    assert_eq!(vertex_count(EntityKind::Keyword), 1);
    assert_eq!(vertex_count(EntityKind::Author), 1);
    assert_eq!(vertex_count(EntityKind::Organization), 1);
    assert_eq!(vertex_count(EntityKind::Fund), 1);
}

#[test]
fn test_vertices_precede_their_edges() {
    let (rows, documents) = corpus();
    let mut context = LoadContext::new();
    let mut loader = PaperLoader::new(&mut context, 500);
    loader.stage(&rows, &documents);

    let mut emitted = std::collections::HashSet::new();
    for statement in loader.pending() {
        match statement {
            Statement::UpsertVertex { id, .. } => {
                emitted.insert(id.clone());
            }
            Statement::UpsertEdge { src, dst, .. } => {
                assert!(emitted.contains(src), "{} emitted before its source", statement);
                assert!(emitted.contains(dst), "{} emitted before its target", statement);
            }
            Statement::Lookup { .. } => panic!("phase 1 never looks up"),
        }
    }
}

#[tokio::test]
async fn test_entity_loader_shares_context() {
    let (rows, documents) = corpus();
    let session = EmbeddedSession::new();
    let mut context = LoadContext::new();
    let mut sink = MemorySink::new();

    PaperLoader::new(&mut context, 500)
        .run(&session, &rows, &documents, &mut sink)
        .await;

    let entities = vec![
        EntityRow {
            name: Some("量子通信".to_string()),
            score: Some("4".to_string()),
            related_papers: Some("['A', \"Q\"]".to_string()),
        },
        EntityRow {
            name: Some("芯片".to_string()),
            score: None,
            related_papers: None,
        },
    ];
    let report = EntityLoader::new(&mut context, 500)
        .run(&session, &entities, &mut sink)
        .await;

    assert_eq!(report.stage.vertex_statements, 2);
    assert_eq!(report.resolution.resolved, 1);
    assert_eq!(report.resolution.dropped, 1);
    assert!(sink.contents().ends_with("实体: 量子通信\n  - Q\n\n"));
    assert_eq!(context.registry.assigned(EntityKind::SensitiveEntity), 2);
    assert_eq!(context.registry.assigned(EntityKind::Paper), 2);

    let store = session.store_read().await;
    assert!(store.has_edge(
        RelationKind::RelatedToPaper,
        &id("sensitive_entity01"),
        &id("paper01")
    ));
    assert_eq!(store.integer_property(&id("sensitive_entity01"), "sensitive"), Some(4));
}

/// Rejects every journal vertex; everything else goes to the embedded store.
struct JournalRejectingSession {
    inner: EmbeddedSession,
}

#[async_trait]
impl GraphSession for JournalRejectingSession {
    async fn execute(&self, statement: &Statement) -> SessionResult<ExecutionResult> {
        match statement {
            Statement::UpsertVertex {
                kind: EntityKind::Journal,
                ..
            } => Ok(ExecutionResult::failure("journal tag missing")),
            other => self.inner.execute(other).await,
        }
    }
}

#[tokio::test]
async fn test_rejected_statements_do_not_stop_the_load() {
    let (rows, documents) = corpus();
    let session = JournalRejectingSession {
        inner: EmbeddedSession::new(),
    };
    let mut context = LoadContext::new();
    let mut sink = MemorySink::new();

    let report = PaperLoader::new(&mut context, 3)
        .run(&session, &rows, &documents, &mut sink)
        .await;

    // the journal vertex and both which_journal edges
    assert_eq!(report.vertices.failed_count(), 3);
    assert_eq!(report.vertices.executed, report.vertices.total);
    assert_eq!(report.resolution.resolved, 2);

    let store = session.inner.store_read().await;
    assert_eq!(store.vertices_by_kind(EntityKind::Journal).len(), 0);
    assert_eq!(store.vertices_by_kind(EntityKind::Keyword).len(), 3);
    assert_eq!(store.edges_by_relation(RelationKind::Reference).len(), 2);
}
