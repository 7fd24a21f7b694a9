//! Pipeline configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An override file: the path given by the caller, else
//!    `~/.local/share/gastos/config.toml` if present
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Missing keys in an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::categorize::CategoryHeuristic;
use crate::error::{Error, Result};
use crate::models::Category;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/gastos.toml");

/// Batch import settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Rows per store call
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { batch_size: 20 }
    }
}

/// Completion service settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub timeout: Duration,
    /// Propagate transport failures instead of falling back to rules
    pub strict: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            strict: false,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GastosConfig {
    pub import: ImportConfig,
    pub heuristic: CategoryHeuristic,
    pub completion: CompletionConfig,
    /// File the config was read from (None = embedded defaults)
    pub source: Option<PathBuf>,
}

impl GastosConfig {
    /// Load configuration, preferring `path` over the default override location
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match default_config_path().filter(|p| p.exists()) {
            Some(default_path) => Self::from_file(&default_path),
            None => Self::embedded(),
        }
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let mut config = parse_config(&content)?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded config override");
        Ok(config)
    }
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("gastos").join("config.toml"))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    import: Option<RawImport>,
    heuristic: Option<RawHeuristic>,
    completion: Option<RawCompletion>,
}

#[derive(Debug, Deserialize)]
struct RawImport {
    batch_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawHeuristic {
    income_threshold: Option<f64>,
    housing_threshold: Option<f64>,
    small_expense_threshold: Option<f64>,
    large_income_category: Option<String>,
    small_income_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCompletion {
    timeout_secs: Option<u64>,
    strict: Option<bool>,
}

fn parse_config(content: &str) -> Result<GastosConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = GastosConfig::default();

    if let Some(import) = raw.import {
        if let Some(batch_size) = import.batch_size {
            if batch_size == 0 {
                return Err(Error::Config("import.batch_size must be at least 1".into()));
            }
            config.import.batch_size = batch_size;
        }
    }

    if let Some(heuristic) = raw.heuristic {
        let target = &mut config.heuristic;
        if let Some(v) = heuristic.income_threshold {
            target.income_threshold = threshold("heuristic.income_threshold", v)?;
        }
        if let Some(v) = heuristic.housing_threshold {
            target.housing_threshold = threshold("heuristic.housing_threshold", v)?;
        }
        if let Some(v) = heuristic.small_expense_threshold {
            target.small_expense_threshold = threshold("heuristic.small_expense_threshold", v)?;
        }
        if let Some(id) = heuristic.large_income_category {
            target.large_income_category = category_id("heuristic.large_income_category", &id)?;
        }
        if let Some(id) = heuristic.small_income_category {
            target.small_income_category = category_id("heuristic.small_income_category", &id)?;
        }
    }

    if let Some(completion) = raw.completion {
        if let Some(secs) = completion.timeout_secs {
            if secs == 0 {
                return Err(Error::Config(
                    "completion.timeout_secs must be at least 1".into(),
                ));
            }
            config.completion.timeout = Duration::from_secs(secs);
        }
        if let Some(strict) = completion.strict {
            config.completion.strict = strict;
        }
    }

    Ok(config)
}

fn threshold(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::Config(format!("{} must be a non-negative number", key)))
    }
}

// Config names categories by id only, not display names
fn category_id(key: &str, id: &str) -> Result<Category> {
    Category::all()
        .iter()
        .copied()
        .find(|c| c.as_str() == id)
        .ok_or_else(|| Error::Config(format!("{}: unknown category id '{}'", key, id)))
}
