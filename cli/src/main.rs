//! CLI entrypoint for easel
//!
//! Wires the layers together with dependency injection: in-memory document
//! store, Anthropic reasoning backend, orchestration loop, and command
//! service. Seeds a demo document, submits one command, and prints the
//! structured response.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use easel_application::{
    CommandRequest, CommandService, DocumentStorePort, OrchestratorParams, ProcessCommandUseCase,
};
use easel_domain::{CATALOG_VERSION, CanvasObject, CanvasSize, ObjectKind, OperationRegistry};
use easel_infrastructure::catalog::JsonCatalogConverter;
use easel_infrastructure::config::ConfigLoader;
use easel_infrastructure::logging::JsonlCommandLogger;
use easel_infrastructure::providers::AnthropicBackend;
use easel_infrastructure::store::InMemoryDocumentStore;
use easel_application::ports::catalog_schema::CatalogSchemaPort;

#[derive(Parser, Debug)]
#[command(name = "easel", about = "Natural-language commands against a shared 2-D canvas")]
struct Cli {
    /// The command to run against the canvas
    text: Option<String>,

    /// Document to operate on
    #[arg(short, long, default_value = "demo")]
    document: String,

    /// Acting user id
    #[arg(short, long, default_value = "local-user")]
    user: String,

    /// Seed the demo document with this many shapes
    #[arg(long, default_value_t = 6)]
    seed: usize,

    /// Comma-separated object ids to mark as selected
    #[arg(long)]
    select: Option<String>,

    /// Explicit configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the operation catalog as JSON and exit
    #[arg(long)]
    show_catalog: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(cli: &Cli) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if let Some(log_file) = &cli.log_file {
        let directory = log_file.parent().filter(|p| !p.as_os_str().is_empty());
        let file_name = log_file
            .file_name()
            .context("log file path has no file name")?;
        let appender = tracing_appender::rolling::never(
            directory.unwrap_or_else(|| std::path::Path::new(".")),
            file_name,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        Ok(None)
    }
}

/// Seed the demo document with a spread of colored shapes.
fn demo_objects(count: usize) -> Vec<CanvasObject> {
    let colors = ["#ef4444", "#3b82f6", "#22c55e", "#eab308"];
    let kinds = [ObjectKind::Rectangle, ObjectKind::Ellipse];
    (0..count)
        .map(|i| {
            CanvasObject::new(
                format!("seed-{}", i),
                kinds[i % kinds.len()],
                "demo-seed",
                chrono::Utc::now(),
            )
            .at(80.0 * i as f64 + 40.0, 60.0 * (i % 3) as f64 + 40.0)
            .sized(60.0, 40.0)
            .colored(colors[i % colors.len()])
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_catalog {
        let registry = OperationRegistry::standard();
        let catalog = JsonCatalogConverter.catalog_schema(&registry);
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "version": CATALOG_VERSION,
                "operations": catalog,
            }))?
        );
        return Ok(());
    }

    let Some(text) = cli.text.clone() else {
        bail!("A command is required. Try: easel \"draw a red rectangle\"");
    };

    let config = ConfigLoader::load(cli.config.as_ref())?;
    info!(model = %config.provider.model, "Starting easel");

    // === Dependency injection ===
    let store = Arc::new(InMemoryDocumentStore::new());
    store
        .seed_document(&cli.document, CanvasSize::default(), demo_objects(cli.seed))
        .await;
    if let Some(select) = &cli.select {
        let ids: Vec<String> = select
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        store.set_selection(&cli.document, ids).await?;
    }

    let backend = Arc::new(AnthropicBackend::from_config(&config.provider).map_err(|_| {
        anyhow::anyhow!(
            "Missing API key: set the {} environment variable",
            config.provider.api_key_env
        )
    })?);

    let params: OrchestratorParams = config.orchestrator.to_params();
    let processor = Arc::new(ProcessCommandUseCase::new(
        backend,
        store.clone(),
        &JsonCatalogConverter,
        params,
    ));

    let mut service = CommandService::new(processor, &params);
    if let Some(log_path) = &config.logging.command_log
        && let Some(logger) = JsonlCommandLogger::new(log_path)
    {
        let logger = Arc::new(logger);
        service = service
            .with_command_log(logger.clone())
            .with_observer(logger);
    }

    let request = CommandRequest::new(text, cli.document.clone(), cli.user.clone());
    match service.handle(request).await {
        Ok(success) => {
            println!("{}", success.assistant_text);
            if !success.operations.is_empty() {
                println!();
                for op in &success.operations {
                    let status = if op.success { "ok" } else { "failed" };
                    let mut detail = String::new();
                    if !op.created_ids.is_empty() {
                        detail.push_str(&format!(" created {}", op.created_ids.join(", ")));
                    }
                    if !op.modified_ids.is_empty() {
                        detail.push_str(&format!(" modified {}", op.modified_ids.join(", ")));
                    }
                    println!("  [{}] {}{}", status, op.operation, detail);
                }
            }
            println!();
            println!(
                "command {} finished in {}ms ({} tokens)",
                success.command_id,
                success.elapsed_ms,
                success.usage.total()
            );

            let snapshot = store.read_snapshot(&cli.document).await?;
            println!(
                "canvas now holds {} objects",
                snapshot.object_count()
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("error [{}]: {}", error.kind, error.message);
            for suggestion in &error.suggestions {
                eprintln!("  hint: {}", suggestion);
            }
            std::process::exit(1);
        }
    }
}
