//! Runtime settings read from the environment.
//!
//! The binary loads `.env` with `dotenvy` before calling [`Settings::from_env`]; command-line
//! flags are applied on top with the `with_*` methods.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::handlers::DEFAULT_DATASET_PATH;
use crate::retriever::DEFAULT_TOP_K;
use crate::utils::get_database_path;

pub const API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const DATASET_VAR: &str = "ECOROUTE_DATASET";
pub const DB_VAR: &str = "ECOROUTE_DB";
pub const TOP_K_VAR: &str = "ECOROUTE_TOP_K";

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub dataset: PathBuf,
    pub database: PathBuf,
    pub top_k: usize,
}

impl Settings {
    /// Reads settings from environment variables, applying defaults for unset ones.
    ///
    /// An unparseable `ECOROUTE_TOP_K` is ignored with a warning. A blank API key counts
    /// as unset.
    ///
    /// # Errors
    ///
    /// Returns an error only when no database path is configured and the platform data
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let api_key = non_empty_var(API_KEY_VAR);

        let dataset = non_empty_var(DATASET_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));

        let database = match non_empty_var(DB_VAR) {
            Some(path) => PathBuf::from(path),
            None => get_database_path().context("No database path configured")?,
        };

        let top_k = match non_empty_var(TOP_K_VAR) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(k) if k > 0 => k,
                _ => {
                    warn!(value = %raw, "ignoring invalid {TOP_K_VAR}");
                    DEFAULT_TOP_K
                }
            },
            None => DEFAULT_TOP_K,
        };

        Ok(Self {
            api_key,
            dataset,
            database,
            top_k,
        })
    }

    /// Overrides the dataset path when `path` is given.
    pub fn with_dataset(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.dataset = path;
        }
        self
    }

    /// Overrides the database path when `path` is given.
    pub fn with_database(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database = path;
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_vars() {
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::remove_var(API_KEY_VAR);
            std::env::remove_var(DATASET_VAR);
            std::env::remove_var(DB_VAR);
            std::env::remove_var(TOP_K_VAR);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_unset() {
        clear_vars();

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.api_key, None);
        assert_eq!(settings.dataset, PathBuf::from(DEFAULT_DATASET_PATH));
        assert!(settings.database.ends_with("ecoroute/passages.db"));
        assert_eq!(settings.top_k, DEFAULT_TOP_K);
    }

    #[test]
    #[serial]
    fn environment_values_are_read() {
        clear_vars();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(API_KEY_VAR, " secret ");
            std::env::set_var(DATASET_VAR, "/tmp/co2.csv");
            std::env::set_var(DB_VAR, "/tmp/passages.db");
            std::env::set_var(TOP_K_VAR, "7");
        }

        let settings = Settings::from_env().unwrap();
        clear_vars();

        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.dataset, PathBuf::from("/tmp/co2.csv"));
        assert_eq!(settings.database, PathBuf::from("/tmp/passages.db"));
        assert_eq!(settings.top_k, 7);
    }

    #[test]
    #[serial]
    fn invalid_top_k_falls_back_to_default() {
        clear_vars();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(TOP_K_VAR, "zero");
        }

        let settings = Settings::from_env().unwrap();
        clear_vars();

        assert_eq!(settings.top_k, DEFAULT_TOP_K);
    }

    #[test]
    #[serial]
    fn blank_api_key_counts_as_unset() {
        clear_vars();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(API_KEY_VAR, "   ");
        }

        let settings = Settings::from_env().unwrap();
        clear_vars();

        assert_eq!(settings.api_key, None);
    }

    #[test]
    #[serial]
    fn flags_override_environment() {
        clear_vars();
        // SAFETY: serialized test
        unsafe {
            std::env::set_var(DATASET_VAR, "/env/co2.csv");
        }

        let settings = Settings::from_env()
            .unwrap()
            .with_dataset(Some(PathBuf::from("/flag/co2.csv")))
            .with_database(None);
        clear_vars();

        assert_eq!(settings.dataset, PathBuf::from("/flag/co2.csv"));
        assert!(settings.database.ends_with("ecoroute/passages.db"));
    }
}
