//! TOML configuration file
//!
//! The file uses the command line option names as keys:
//!
//! ```toml
//! analyzer = "whitespace"
//! extension = "py"
//! exclude-dir = ["node_modules", "vendor"]
//! threshold-previous = 0.3
//! metric = "blank_space_ratio"
//! log-level = "debug"
//! ```
//!
//! Without `--config-file` the file is looked up at
//! `<config dir>/Repodrift/repodrift.toml` and silently skipped when absent.

use std::path::{Path, PathBuf};

use crate::app::error::{AppError, AppResult};
use crate::core::settings::SettingsBuilder;
use crate::core::validation::ValidationError;

/// Logging options that can be set in the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggingLayer {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<String>,
    pub color: Option<bool>,
}

/// Everything read from one configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
    pub path: Option<PathBuf>,
    pub settings: SettingsBuilder,
    pub logging: LoggingLayer,
}

const KNOWN_KEYS: &[&str] = &[
    "repository",
    "analyzer",
    "extension",
    "exclude-dir",
    "threshold-previous",
    "threshold-mean",
    "workers",
    "output-dir",
    "format",
    "metric",
    "context-metric",
    "from-matrix",
    "log-level",
    "log-format",
    "log-file",
    "color",
];

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Repodrift").join("repodrift.toml"))
}

/// Load the explicit file, or the default one if it exists
///
/// An explicit file that does not exist is an error.
pub fn load_config(config_file: Option<&Path>) -> AppResult<ConfigLayer> {
    let path = match config_file {
        Some(path) if !path.exists() => {
            return Err(AppError::config_file(
                path,
                format!("The configuration file {} does not exist", path.display()),
            ))
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigLayer::default()),
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        AppError::config_file(&path, format!("Cannot read {}: {}", path.display(), e))
    })?;
    let table = contents.parse::<toml::Table>().map_err(|e| {
        AppError::config_file(&path, format!("Cannot parse {}: {}", path.display(), e))
    })?;
    let mut layer = parse_config(&table).map_err(|e| {
        AppError::config_file(&path, format!("{}: {}", path.display(), e.message()))
    })?;
    layer.path = Some(path);
    Ok(layer)
}

/// Convert a parsed table into settings and logging layers
pub fn parse_config(table: &toml::Table) -> Result<ConfigLayer, ValidationError> {
    let unknown: Vec<&str> = table
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_KEYS.contains(key))
        .collect();
    if !unknown.is_empty() {
        return Err(ValidationError::new(format!(
            "unknown configuration keys: {}",
            unknown.join(", ")
        )));
    }

    let settings = SettingsBuilder {
        repository: string(table, "repository")?.map(PathBuf::from),
        analyzer: string(table, "analyzer")?,
        extension: string(table, "extension")?,
        excluded_dirs: string_list(table, "exclude-dir")?,
        threshold_previous: number(table, "threshold-previous")?,
        threshold_mean: number(table, "threshold-mean")?,
        workers: count(table, "workers")?,
        output_dir: string(table, "output-dir")?.map(PathBuf::from),
        output_format: string(table, "format")?,
        detect_metrics: string_list(table, "metric")?,
        context_metric: string(table, "context-metric")?,
        from_matrix: string(table, "from-matrix")?.map(PathBuf::from),
    };

    let logging = LoggingLayer {
        level: string(table, "log-level")?,
        format: string(table, "log-format")?,
        file: string(table, "log-file")?,
        color: match table.get("color") {
            None => None,
            Some(value) => Some(
                value
                    .as_bool()
                    .ok_or_else(|| type_error("color", "a boolean"))?,
            ),
        },
    };

    Ok(ConfigLayer {
        path: None,
        settings,
        logging,
    })
}

fn type_error(key: &str, expected: &str) -> ValidationError {
    ValidationError::new(format!("'{}' must be {}", key, expected))
}

fn string(table: &toml::Table, key: &str) -> Result<Option<String>, ValidationError> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| type_error(key, "a string")),
    }
}

/// A single string, a comma-separated string, or an array of strings
fn string_list(table: &toml::Table, key: &str) -> Result<Option<Vec<String>>, ValidationError> {
    let Some(value) = table.get(key) else {
        return Ok(None);
    };
    let items: Vec<&str> = if let Some(s) = value.as_str() {
        vec![s]
    } else if let Some(array) = value.as_array() {
        array
            .iter()
            .map(|item| item.as_str().ok_or_else(|| type_error(key, "a list of strings")))
            .collect::<Result<_, _>>()?
    } else {
        return Err(type_error(key, "a string or a list of strings"));
    };

    let mut values: Vec<String> = Vec::new();
    for item in items.iter().flat_map(|s| s.split(',')) {
        let item = item.trim();
        if !item.is_empty() && !values.iter().any(|v| v == item) {
            values.push(item.to_string());
        }
    }
    Ok(Some(values))
}

fn number(table: &toml::Table, key: &str) -> Result<Option<f64>, ValidationError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Float(f)) => Ok(Some(*f)),
        Some(toml::Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(_) => Err(type_error(key, "a number")),
    }
}

fn count(table: &toml::Table, key: &str) -> Result<Option<usize>, ValidationError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Integer(i)) => usize::try_from(*i)
            .map(Some)
            .map_err(|_| type_error(key, "a non-negative integer")),
        Some(_) => Err(type_error(key, "an integer")),
    }
}
