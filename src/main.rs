use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecoroute::doctor::HealthReport;
use ecoroute::handlers::{AirQualityHandler, DocumentHandler, VisualizationHandler};
use ecoroute::llm::{LanguageModel, OllamaClient, OllamaClientBuilder};
use ecoroute::openweather::OpenWeatherClientBuilder;
use ecoroute::utils::{ensure_database_directory, write_html};
use ecoroute::{Database, Dispatcher, PassageStore, RouteError, RoutingDecision, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ecoroute - routes environmental questions to documents, live air quality or an emissions map
#[derive(Parser)]
#[command(name = "ecoroute")]
#[command(about = "Routes environmental questions to the right data source")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Passage database path (overrides ECOROUTE_DB)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Emissions dataset path (overrides ECOROUTE_DATASET)
    #[arg(long, value_name = "PATH", global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a question and print the answer
    Ask(AskCommand),
    /// Chunk text files into the passage store
    Ingest(IngestCommand),
    /// Open the interactive terminal interface
    Tui,
    /// Check Ollama, the API key, the passage store and the dataset
    Doctor,
}

#[derive(Parser)]
struct AskCommand {
    /// The question to route
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Write the interactive emissions map to this HTML file
    #[arg(long, value_name = "PATH")]
    chart_out: Option<PathBuf>,
}

#[derive(Parser)]
struct IngestCommand {
    /// UTF-8 text files to ingest
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(&cli);

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ecoroute={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// Blank questions and unusable routing answers are user errors; model transport,
/// storage and I/O failures are internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<RouteError>()
        .is_some_and(RouteError::is_user_error)
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::from_env()?
        .with_database(cli.db.clone())
        .with_dataset(cli.dataset.clone());

    match &cli.command {
        Commands::Ask(cmd) => handle_ask(cmd, &settings),
        Commands::Ingest(cmd) => handle_ingest(cmd, &settings),
        Commands::Tui => handle_tui(&settings),
        Commands::Doctor => handle_doctor(&settings),
    }
}

fn open_store(settings: &Settings) -> Result<PassageStore> {
    ensure_database_directory(&settings.database)?;
    let db = Database::open(&settings.database).context("Failed to open database")?;
    Ok(PassageStore::new(db, settings.top_k))
}

fn build_model() -> Result<OllamaClient> {
    OllamaClientBuilder::new()
        .build()
        .context("Failed to configure the Ollama client")
}

/// Wires the classifier and the three handlers to their collaborators.
fn build_dispatcher(settings: &Settings) -> Result<Dispatcher> {
    let model: Arc<dyn LanguageModel> = Arc::new(build_model()?);
    let store = Arc::new(open_store(settings)?);

    let mut weather = OpenWeatherClientBuilder::new();
    if let Some(key) = &settings.api_key {
        weather = weather.api_key(key.as_str());
    }
    let weather = Arc::new(
        weather
            .build()
            .context("Failed to configure the OpenWeatherMap client")?,
    );

    let dispatcher = Dispatcher::builder(Arc::clone(&model))
        .document_handler(Arc::new(DocumentHandler::new(store, Arc::clone(&model))))
        .air_quality_handler(Arc::new(AirQualityHandler::new(model, weather)))
        .visualization_handler(Arc::new(VisualizationHandler::new(&settings.dataset)))
        .build()?;

    Ok(dispatcher)
}

fn handle_ask(cmd: &AskCommand, settings: &Settings) -> Result<()> {
    let dispatcher = build_dispatcher(settings)?;
    execute_ask(&dispatcher, &cmd.question, cmd.chart_out.as_deref())
}

/// Executes the ask command logic with a provided dispatcher.
///
/// Separated from `handle_ask` to allow testing with stub collaborators.
fn execute_ask(dispatcher: &Dispatcher, question: &str, chart_out: Option<&Path>) -> Result<()> {
    let routed = dispatcher.route(question)?;
    let (text, chart) = routed.result.into_parts();

    println!("## {}\n", routed.decision.heading());
    println!("{text}");

    match (chart, chart_out) {
        (Some(chart), Some(path)) => {
            write_html(path, &chart.to_html())?;
            println!("\nMap written to {}", path.display());
        }
        (Some(_), None) => {
            println!("\nUse --chart-out <PATH> to save the interactive map.");
        }
        (None, _) if routed.decision == RoutingDecision::Visualization => {
            warn!("no map was generated");
        }
        (None, _) => {}
    }

    Ok(())
}

fn handle_ingest(cmd: &IngestCommand, settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    execute_ingest(&store, &cmd.files)
}

/// Ingests every file, stopping at the first unreadable one.
fn execute_ingest(store: &PassageStore, files: &[PathBuf]) -> Result<()> {
    let mut total = 0;
    for path in files {
        let report = store.ingest_file(path)?;
        let verb = if report.replaced { "Replaced" } else { "Ingested" };
        println!("{verb} {} ({} passages)", report.source, report.passages);
        total += report.passages;
    }

    info!(files = files.len(), passages = total, "ingestion finished");
    println!("{} file(s), {total} passage(s)", files.len());
    Ok(())
}

fn handle_tui(settings: &Settings) -> Result<()> {
    let dispatcher = build_dispatcher(settings)?;
    ecoroute::tui::run(&dispatcher)
}

fn handle_doctor(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let client = build_model()?;
    let report = ecoroute::doctor::run_health_checks(settings, &store, &client)?;
    doctor_outcome(&report)
}

/// Fails when any component reported an error.
fn doctor_outcome(report: &HealthReport) -> Result<()> {
    if report.is_healthy() {
        Ok(())
    } else {
        anyhow::bail!("One or more health checks failed")
    }
}
