//! Test configuration shared by every benchmark suite.
//!
//! Values are layered: defaults, then an optional JSON file named by
//! `BENCHMARK_CONFIG`, then environment variables.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::BenchError;

pub const CONFIG_FILE_VAR: &str = "BENCHMARK_CONFIG";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const BENCHMARK_DATABASE_URL_VAR: &str = "BENCHMARK_DATABASE_URL";
pub const DATA_DIR_VAR: &str = "BENCHMARK_DATA_DIR";
pub const RESULTS_DIR_VAR: &str = "BENCHMARK_RESULTS_DIR";

static INSTANCE: OnceLock<TestConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Explicit connection string. Used verbatim for every database name.
    pub database_url: Option<String>,
    /// Directory holding the SQLite files when no explicit URL is configured
    pub data_dir: PathBuf,
    /// Where JSON reports go. No files are written when unset.
    pub results_dir: Option<PathBuf>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            data_dir: std::env::temp_dir().join("ormbench"),
            results_dir: None,
        }
    }
}

impl TestConfig {
    /// Process-wide configuration, loaded on first use.
    ///
    /// Only a successful load is cached. A broken config file is reported on
    /// every call so benchmarks never run against a store nobody asked for.
    ///
    /// # Errors
    ///
    /// Fails when the file named by `BENCHMARK_CONFIG` cannot be read or parsed.
    pub fn instance() -> Result<&'static Self, BenchError> {
        if let Some(config) = INSTANCE.get() {
            return Ok(config);
        }
        let config = Self::from_env()?;
        Ok(INSTANCE.get_or_init(|| config))
    }

    /// Load the configuration from `BENCHMARK_CONFIG` and environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the named config file cannot be read or parsed.
    pub fn from_env() -> Result<Self, BenchError> {
        Self::load(|name| std::env::var_os(name))
    }

    /// Same as [`from_env`](Self::from_env) with variables read through `var`
    ///
    /// # Errors
    ///
    /// Fails when the named config file cannot be read or parsed.
    pub fn load<F>(var: F) -> Result<Self, BenchError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = match var(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(url) = var(DATABASE_URL_VAR).or_else(|| var(BENCHMARK_DATABASE_URL_VAR)) {
            config.database_url = Some(url.to_string_lossy().into_owned());
        }
        if let Some(dir) = var(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(RESULTS_DIR_VAR) {
            config.results_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// # Errors
    ///
    /// Fails when the file is missing or is not a valid config document.
    pub fn from_file(path: &Path) -> Result<Self, BenchError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BenchError::configuration(format!(
                "Cannot read benchmark config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Fails when `raw` is not a valid config document.
    pub fn from_json(raw: &str) -> Result<Self, BenchError> {
        serde_json::from_str(raw)
            .map_err(|e| BenchError::configuration(format!("Invalid benchmark config: {e}")))
    }

    /// Connection string for the named benchmark database
    #[must_use]
    pub fn connection_string(&self, database: &str) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite://{}?mode=rwc",
                self.data_dir.join(format!("{database}.sqlite")).display()
            ),
        }
    }

    /// Create the SQLite data directory if it is in use.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created.
    pub fn ensure_data_dir(&self) -> Result<(), BenchError> {
        if self.database_url.is_none() {
            std::fs::create_dir_all(&self.data_dir)
                .map_err(|e| BenchError::io(&self.data_dir, e))?;
        }
        Ok(())
    }
}
