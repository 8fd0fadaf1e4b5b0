//! Papergraph CLI: load paper metadata into a property-graph store
//!
//! Talks to a running store through `RemoteSession`, or loads into an
//! in-process graph with `--dry-run`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use papergraph::source::{entity_rows, paper_rows, read_documents_file};
use papergraph::{
    Dialect, EmbeddedSession, EntityLoader, EntityRow, EntityRunReport, FileSink, FlushReport,
    GraphSession, LoadContext, LoaderConfig, MemoryGraph, PaperDocument, PaperLoader, PaperRow,
    PaperRunReport, RemoteSession, ResolutionSummary, Sheet,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "papergraph", version, about = "Load paper metadata into a property-graph store")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store HTTP URL
    #[arg(long, global = true, env = "PAPERGRAPH_URL")]
    url: Option<String>,

    /// Statement dialect of the store (cypher or ngql)
    #[arg(long, global = true)]
    dialect: Option<Dialect>,

    /// Statements per batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// File receiving unresolved references
    #[arg(long, global = true)]
    not_found_log: Option<PathBuf>,

    /// Load into an in-process graph instead of the store
    #[arg(long, global = true)]
    dry_run: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load papers, their documents and citations, then optionally entities
    Load {
        /// Paper sheet (CSV or JSON)
        #[arg(long)]
        papers: PathBuf,

        /// Nested paper documents (JSON array, same order as the sheet)
        #[arg(long)]
        documents: PathBuf,

        /// Sensitive-entity sheet (CSV or JSON)
        #[arg(long)]
        entities: Option<PathBuf>,
    },
    /// Load sensitive entities and link them to already loaded papers
    Entities {
        /// Sensitive-entity sheet (CSV or JSON)
        #[arg(long)]
        entities: PathBuf,
    },
    /// Print the rendered paper statements without executing them
    Render {
        /// Paper sheet (CSV or JSON)
        #[arg(long)]
        papers: PathBuf,

        /// Nested paper documents
        #[arg(long)]
        documents: PathBuf,

        /// Print at most this many statements
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Open session, plus the in-process graph when running dry.
struct Connection {
    session: Box<dyn GraphSession>,
    embedded: Option<Arc<RwLock<MemoryGraph>>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Load {
            papers,
            documents,
            entities,
        } => {
            let (rows, docs) = read_papers(&config, papers, documents)?;
            let sensitive_rows = match entities {
                Some(path) => Some(read_entities(&config, path)?),
                None => None,
            };
            let connection = connect(&config, cli.dry_run).await?;
            let mut sink = FileSink::new(&config.not_found_log);
            let mut context = LoadContext::new();

            let paper_report = PaperLoader::new(&mut context, config.batch_size)
                .run(connection.session.as_ref(), &rows, &docs, &mut sink)
                .await;
            let entity_report = match sensitive_rows {
                Some(sensitive_rows) => Some(
                    EntityLoader::new(&mut context, config.batch_size)
                        .run(connection.session.as_ref(), &sensitive_rows, &mut sink)
                        .await,
                ),
                None => None,
            };

            print_reports(Some(&paper_report), entity_report.as_ref(), cli.format)?;
            print_store_counts(&connection).await;
        }
        Commands::Entities { entities } => {
            let sensitive_rows = read_entities(&config, entities)?;
            let connection = connect(&config, cli.dry_run).await?;
            let mut sink = FileSink::new(&config.not_found_log);
            let mut context = LoadContext::new();

            let report = EntityLoader::new(&mut context, config.batch_size)
                .run(connection.session.as_ref(), &sensitive_rows, &mut sink)
                .await;

            print_reports(None, Some(&report), cli.format)?;
            print_store_counts(&connection).await;
        }
        Commands::Render {
            papers,
            documents,
            limit,
        } => {
            let (rows, docs) = read_papers(&config, papers, documents)?;
            let mut context = LoadContext::new();
            let mut loader = PaperLoader::new(&mut context, config.batch_size);
            loader.stage(&rows, &docs);
            let statements = loader.take_pending();
            let shown = limit.unwrap_or(statements.len()).min(statements.len());

            let rendered: Vec<_> = statements[..shown]
                .iter()
                .map(|s| s.render(config.store.dialect))
                .collect();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
                OutputFormat::Table => {
                    for statement in &rendered {
                        println!("{};", statement.text);
                        if !statement.params.is_empty() {
                            let params = serde_json::Value::Object(statement.params.clone());
                            println!("  -- params: {}", params);
                        }
                    }
                    println!("{} of {} statement(s)", shown, statements.len());
                }
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<LoaderConfig> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_yaml_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => LoaderConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.store.url = url.clone();
    }
    if let Some(dialect) = cli.dialect {
        config.store.dialect = dialect;
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(path) = &cli.not_found_log {
        config.not_found_log = path.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_papers(
    config: &LoaderConfig,
    papers: &Path,
    documents: &Path,
) -> anyhow::Result<(Vec<PaperRow>, Vec<PaperDocument>)> {
    let sheet = Sheet::from_path(papers)
        .with_context(|| format!("reading paper sheet {}", papers.display()))?;
    let rows = paper_rows(&sheet, &config.columns)?;
    let docs = read_documents_file(documents)
        .with_context(|| format!("reading paper documents {}", documents.display()))?;
    Ok((rows, docs))
}

fn read_entities(config: &LoaderConfig, path: &Path) -> anyhow::Result<Vec<EntityRow>> {
    let sheet = Sheet::from_path(path)
        .with_context(|| format!("reading entity sheet {}", path.display()))?;
    Ok(entity_rows(&sheet, &config.entity_columns)?)
}

async fn connect(config: &LoaderConfig, dry_run: bool) -> anyhow::Result<Connection> {
    if dry_run {
        info!("Dry run: loading into an in-process graph");
        let store = Arc::new(RwLock::new(MemoryGraph::new()));
        return Ok(Connection {
            session: Box::new(EmbeddedSession::with_store(store.clone())),
            embedded: Some(store),
        });
    }

    let session = RemoteSession::connect(&config.store)
        .await
        .with_context(|| format!("connecting to graph store at {}", config.store.url))?;
    Ok(Connection {
        session: Box::new(session),
        embedded: None,
    })
}

fn print_reports(
    papers: Option<&PaperRunReport>,
    entities: Option<&EntityRunReport>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "papers": papers,
                "entities": entities,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => {
            let mut flushes = Table::new();
            flushes.set_content_arrangement(ContentArrangement::Dynamic);
            flushes.set_header(vec![
                "Phase",
                "Statements",
                "Succeeded",
                "Failed",
                "Batches",
                "Elapsed (ms)",
            ]);

            let mut resolutions = Table::new();
            resolutions.set_content_arrangement(ContentArrangement::Dynamic);
            resolutions.set_header(vec![
                "References",
                "Considered",
                "Resolved",
                "Unresolved",
                "Lookup failures",
            ]);

            if let Some(report) = papers {
                println!(
                    "Paper rows: {} loaded, {} skipped",
                    report.stage.rows, report.stage.skipped_rows
                );
                flushes.add_row(flush_row("paper metadata", &report.vertices));
                flushes.add_row(flush_row("citations", &report.references));
                resolutions.add_row(resolution_row("citations", &report.resolution));
            }
            if let Some(report) = entities {
                println!(
                    "Entity rows: {} loaded, {} skipped",
                    report.stage.rows, report.stage.skipped_rows
                );
                flushes.add_row(flush_row("sensitive entities", &report.vertices));
                flushes.add_row(flush_row("associations", &report.associations));
                resolutions.add_row(resolution_row("associations", &report.resolution));
            }

            println!("{}", flushes);
            println!("{}", resolutions);
        }
    }
    Ok(())
}

fn flush_row(phase: &str, report: &FlushReport) -> Vec<String> {
    vec![
        phase.to_string(),
        report.total.to_string(),
        report.succeeded.to_string(),
        report.failed_count().to_string(),
        report.batches.to_string(),
        report.elapsed_ms.to_string(),
    ]
}

fn resolution_row(kind: &str, summary: &ResolutionSummary) -> Vec<String> {
    vec![
        kind.to_string(),
        summary.considered.to_string(),
        summary.resolved.to_string(),
        summary.dropped.to_string(),
        summary.lookup_failures.to_string(),
    ]
}

async fn print_store_counts(connection: &Connection) {
    if let Some(store) = &connection.embedded {
        let store = store.read().await;
        println!(
            "In-process graph: {} vertices, {} edges",
            store.vertex_count(),
            store.edge_count()
        );
    }
}
