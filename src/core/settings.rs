//! Resolved analysis settings
//!
//! [`SettingsBuilder`] collects values layer by layer (defaults, TOML file,
//! command line; later layers win) and [`SettingsBuilder::build`] validates
//! them into an immutable [`AnalysisSettings`].

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use crate::analyzer::registry::AnalyzerKind;
use crate::core::validation::{
    validate_excluded_dir, validate_extension, validate_threshold, validate_workers,
    ValidationError,
};
use crate::detector::deviation::Thresholds;
use crate::export::ExportFormat;

/// Directory names skipped while collecting files
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "test",
    "tests",
    "dist",
    "build",
    "public",
    "assets",
    "bin",
    "coverage",
    "logs",
    "temp",
    "tmp",
    "packages",
];

/// Upper bound of the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 8;

pub const DEFAULT_THRESHOLD_PREVIOUS: f64 = 0.5;
pub const DEFAULT_THRESHOLD_MEAN: f64 = 0.5;

/// `min(core count, 8)`
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Working tree of the repository under audit
    pub repository: PathBuf,
    pub analyzer: AnalyzerKind,
    /// Extension filter without leading dot, `None` analyses every file
    pub extension: Option<String>,
    pub excluded_dirs: BTreeSet<String>,
    pub thresholds: Thresholds,
    pub workers: usize,
    pub output_dir: PathBuf,
    pub output_format: ExportFormat,
    /// Metrics the deviation detector runs on
    pub detect_metrics: Vec<String>,
    /// Secondary metric shown next to each deviation
    pub context_metric: Option<String>,
    /// Previously exported metric table to re-run detection on; no
    /// checkouts happen when set
    pub from_matrix: Option<PathBuf>,
}

/// Layered, not yet validated settings
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    pub repository: Option<PathBuf>,
    pub analyzer: Option<String>,
    pub extension: Option<String>,
    pub excluded_dirs: Option<Vec<String>>,
    pub threshold_previous: Option<f64>,
    pub threshold_mean: Option<f64>,
    pub workers: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub output_format: Option<String>,
    pub detect_metrics: Option<Vec<String>>,
    pub context_metric: Option<String>,
    pub from_matrix: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on top of `self`; values set in `other` win
    pub fn merge(mut self, other: SettingsBuilder) -> Self {
        macro_rules! take {
            ($($field:ident),+ $(,)?) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )+
            };
        }
        take!(
            repository,
            analyzer,
            extension,
            excluded_dirs,
            threshold_previous,
            threshold_mean,
            workers,
            output_dir,
            output_format,
            detect_metrics,
            context_metric,
            from_matrix,
        );
        self
    }

    /// Validate and resolve defaults
    pub fn build(self) -> Result<AnalysisSettings, ValidationError> {
        let repository = match (self.repository, &self.from_matrix) {
            (Some(repository), _) => repository,
            (None, Some(_)) => PathBuf::from("."),
            (None, None) => return Err(ValidationError::new("A repository path is required")),
        };

        let analyzer = match self.analyzer.as_deref() {
            Some(name) => AnalyzerKind::from_str(name).map_err(|_| {
                ValidationError::new(format!(
                    "Unknown analyzer '{}' (expected one of: {})",
                    name,
                    AnalyzerKind::names().join(", ")
                ))
            })?,
            None => AnalyzerKind::default(),
        };

        let extension = match self.extension.as_deref() {
            Some(ext) => Some(validate_extension(ext)?),
            None => None,
        };

        let excluded_dirs = match self.excluded_dirs {
            Some(dirs) => dirs
                .iter()
                .map(|d| validate_excluded_dir(d))
                .collect::<Result<BTreeSet<_>, _>>()?,
            None => DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        };

        let thresholds = Thresholds {
            previous: validate_threshold(
                "threshold-previous",
                self.threshold_previous.unwrap_or(DEFAULT_THRESHOLD_PREVIOUS),
            )?,
            mean: validate_threshold(
                "threshold-mean",
                self.threshold_mean.unwrap_or(DEFAULT_THRESHOLD_MEAN),
            )?,
        };

        let workers = validate_workers(self.workers.unwrap_or_else(default_workers))?;

        let output_format = match self.output_format.as_deref() {
            Some(name) => ExportFormat::from_str(name).map_err(|_| {
                ValidationError::new(format!(
                    "Format '{}' not supported (expected csv or json)",
                    name
                ))
            })?,
            None => ExportFormat::default(),
        };

        let known_metrics = analyzer.metric_names();
        let detect_metrics = match self.detect_metrics {
            Some(metrics) if !metrics.is_empty() => metrics,
            _ => analyzer
                .primary_metrics()
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };
        for metric in &detect_metrics {
            if !known_metrics.contains(&metric.as_str()) {
                return Err(ValidationError::new(format!(
                    "Analyzer '{}' does not produce metric '{}' (available: {})",
                    analyzer,
                    metric,
                    known_metrics.join(", ")
                )));
            }
        }

        let context_metric = match self.context_metric {
            Some(metric) if !known_metrics.contains(&metric.as_str()) => {
                return Err(ValidationError::new(format!(
                    "Analyzer '{}' does not produce context metric '{}'",
                    analyzer, metric
                )));
            }
            Some(metric) => Some(metric),
            None => analyzer.context_metric().map(|m| m.to_string()),
        };

        let output_dir = self
            .output_dir
            .unwrap_or_else(|| default_output_dir(&repository));

        Ok(AnalysisSettings {
            repository,
            analyzer,
            extension,
            excluded_dirs,
            thresholds,
            workers,
            output_dir,
            output_format,
            detect_metrics,
            context_metric,
            from_matrix: self.from_matrix,
        })
    }
}

/// `analytics/<repository directory name>`
fn default_output_dir(repository: &std::path::Path) -> PathBuf {
    let name = repository
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .or_else(|| {
            repository
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "repository".to_string());
    PathBuf::from("analytics").join(name)
}
