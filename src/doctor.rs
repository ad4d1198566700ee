//! Health checks for the `doctor` command.
//!
//! Reports on each collaborator the dispatcher depends on:
//! the passage store, the Ollama server, the OpenWeatherMap key and the emissions dataset.

use std::path::Path;

use anyhow::Result;

use crate::chart::{EmissionsMap, load_records};
use crate::config::Settings;
use crate::llm::OllamaClient;
use crate::retriever::{PassageStore, StoreStats};

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }

    fn describe(&self, ok_text: &str) -> String {
        match self {
            HealthStatus::Ok => ok_text.to_string(),
            HealthStatus::Warning(w) => w.clone(),
            HealthStatus::Error(e) => e.clone(),
        }
    }
}

/// Passage store health information.
#[derive(Debug)]
pub struct StoreHealth {
    pub status: HealthStatus,
    pub file_path: String,
    pub stats: Option<StoreStats>,
}

/// Ollama connectivity information.
#[derive(Debug)]
pub struct OllamaHealth {
    pub status: HealthStatus,
    pub base_url: String,
    pub model: String,
    pub models: Vec<String>,
}

/// Dataset loading information.
#[derive(Debug)]
pub struct DatasetHealth {
    pub status: HealthStatus,
    pub path: String,
    pub regions: usize,
}

/// Everything `doctor` prints.
#[derive(Debug)]
pub struct HealthReport {
    pub store: StoreHealth,
    pub ollama: OllamaHealth,
    pub api_key: HealthStatus,
    pub dataset: DatasetHealth,
}

impl HealthReport {
    /// True when no component is in the error state.
    pub fn is_healthy(&self) -> bool {
        ![
            &self.store.status,
            &self.ollama.status,
            &self.api_key,
            &self.dataset.status,
        ]
        .iter()
        .any(|s| matches!(s, HealthStatus::Error(_)))
    }
}

// ============================================================================
// Health Check Functions
// ============================================================================

/// Performs all health checks, prints the report and returns it.
pub fn run_health_checks(
    settings: &Settings,
    store: &PassageStore,
    client: &OllamaClient,
) -> Result<HealthReport> {
    let report = HealthReport {
        store: check_store(&settings.database, store),
        ollama: check_ollama(client),
        api_key: check_api_key(settings.api_key.as_deref()),
        dataset: check_dataset(&settings.dataset),
    };

    print_health_report(&report);

    Ok(report)
}

fn check_store(db_path: &Path, store: &PassageStore) -> StoreHealth {
    let file_path = db_path.display().to_string();
    match store.stats() {
        Ok(stats) if stats.passages == 0 => StoreHealth {
            status: HealthStatus::Warning(
                "No passages ingested; run `ecoroute ingest <FILES>`".to_string(),
            ),
            file_path,
            stats: Some(stats),
        },
        Ok(stats) => StoreHealth {
            status: HealthStatus::Ok,
            file_path,
            stats: Some(stats),
        },
        Err(e) => StoreHealth {
            status: HealthStatus::Error(format!("Query failed: {e}")),
            file_path,
            stats: None,
        },
    }
}

fn check_ollama(client: &OllamaClient) -> OllamaHealth {
    let base_url = client.base_url().to_string();
    let model = client.model().to_string();

    match client.list_models() {
        Ok(models) => OllamaHealth {
            status: model_status(&model, &models),
            base_url,
            model,
            models,
        },
        Err(e) => OllamaHealth {
            status: HealthStatus::Error(format!("Connection failed: {e}")),
            base_url,
            model,
            models: Vec::new(),
        },
    }
}

/// Checks that the configured model is among the installed ones.
///
/// Ollama lists models with an explicit tag (`mistral:latest`); a configured name without
/// a tag matches any tag of that model.
fn model_status(model: &str, installed: &[String]) -> HealthStatus {
    if installed.is_empty() {
        return HealthStatus::Warning("No models installed".to_string());
    }
    if model.is_empty() {
        return HealthStatus::Error("OLLAMA_MODEL is not set".to_string());
    }

    let found = installed.iter().any(|name| {
        name == model
            || name
                .split_once(':')
                .is_some_and(|(base, _)| !model.contains(':') && base == model)
    });

    if found {
        HealthStatus::Ok
    } else {
        HealthStatus::Error(format!("Model {model} is not installed"))
    }
}

fn check_api_key(key: Option<&str>) -> HealthStatus {
    match key {
        Some(_) => HealthStatus::Ok,
        None => HealthStatus::Warning(
            "OPENWEATHERMAP_API_KEY is not set; air-quality lookups will fail".to_string(),
        ),
    }
}

fn check_dataset(path: &Path) -> DatasetHealth {
    let result = load_records(path).and_then(EmissionsMap::from_records);
    let path = path.display().to_string();

    match result {
        Ok(map) => DatasetHealth {
            status: HealthStatus::Ok,
            path,
            regions: map.points().len(),
        },
        Err(e) => DatasetHealth {
            status: HealthStatus::Error(format!("Failed to load: {e}")),
            path,
            regions: 0,
        },
    }
}

// ============================================================================
// Pretty Printing
// ============================================================================

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn print_status_line(label: &str, status: &HealthStatus, ok_text: &str) {
    println!(
        "  {}{}{} {}: {}",
        status_color(status),
        status_symbol(status),
        RESET,
        label,
        status.describe(ok_text)
    );
}

fn print_health_report(report: &HealthReport) {
    println!("{}ecoroute doctor{}", BOLD, RESET);
    println!();

    println!("{}Passage store{}", BOLD, RESET);
    print_status_line("Status", &report.store.status, "OK");
    println!("    {}Path: {}{}", DIM, report.store.file_path, RESET);
    if let Some(stats) = &report.store.stats {
        println!("  Documents:  {:>6}", stats.documents);
        println!("  Passages:   {:>6}", stats.passages);
    }
    println!();

    let ollama = &report.ollama;
    println!("{}Ollama{}", BOLD, RESET);
    print_status_line("Status", &ollama.status, "Connected");
    println!("    {}URL: {}{}", DIM, ollama.base_url, RESET);
    if !ollama.model.is_empty() {
        println!("    {}Model: {}{}", DIM, ollama.model, RESET);
    }
    if !ollama.models.is_empty() {
        let models_display = if ollama.models.len() > 3 {
            format!(
                "{}, ... ({} more)",
                ollama.models[..3].join(", "),
                ollama.models.len() - 3
            )
        } else {
            ollama.models.join(", ")
        };
        println!("    {}Installed: {}{}", DIM, models_display, RESET);
    }
    println!();

    println!("{}OpenWeatherMap{}", BOLD, RESET);
    print_status_line("API key", &report.api_key, "Configured");
    println!();

    println!("{}Emissions dataset{}", BOLD, RESET);
    print_status_line("Status", &report.dataset.status, "Loaded");
    println!("    {}Path: {}{}", DIM, report.dataset.path, RESET);
    if report.dataset.status.is_ok() {
        println!("  Regions:    {:>6}", report.dataset.regions);
    }
}
