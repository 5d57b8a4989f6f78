//! Command line arguments
//!
//! Every option has a TOML counterpart with the same kebab-case name; see
//! [`super::config`]. Values given here win over the configuration file.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser};

use crate::analyzer::registry::AnalyzerKind;
use crate::core::settings::SettingsBuilder;
use crate::core::styles::palette_to_clap;
use crate::core::version;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repodrift")]
#[command(about = "Flag files whose metrics jump between a repository's release tags")]
#[command(version, long_version = version::long_version())]
#[command(styles = palette_to_clap(true))]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Working tree of the repository to audit (its checkout is moved between tags)
    #[arg(value_name = "REPO")]
    pub repository: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Metric extractor to run
    #[arg(
        short = 'a',
        long = "analyzer",
        value_name = "NAME",
        value_parser = PossibleValuesParser::new(AnalyzerKind::names())
    )]
    pub analyzer: Option<String>,

    /// Only analyse files with this extension
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extension: Option<String>,

    /// Directory names to skip*, replaces the built-in list
    #[arg(long = "exclude-dir", value_name = "DIRS", value_delimiter = ',', action = ArgAction::Append)]
    pub exclude_dirs: Vec<String>,

    /// Minimum change against the previous tag
    #[arg(long = "threshold-previous", value_name = "VALUE")]
    pub threshold_previous: Option<f64>,

    /// Minimum change against the mean of all prior tags
    #[arg(long = "threshold-mean", value_name = "VALUE")]
    pub threshold_mean: Option<f64>,

    /// Worker threads for file analysis (default: cores, at most 8)
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Output directory (default: analytics/<repository name>)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export format
    #[arg(short = 'F', long = "format", value_name = "FORMAT", value_parser = ["csv", "json"])]
    pub format: Option<String>,

    /// Metrics to run deviation detection on*
    #[arg(short = 'm', long = "metric", value_name = "METRICS", value_delimiter = ',', action = ArgAction::Append)]
    pub metrics: Vec<String>,

    /// Secondary metric reported next to each deviation
    #[arg(long = "context-metric", value_name = "METRIC")]
    pub context_metric: Option<String>,

    /// Re-run detection on a previously exported metric table
    #[arg(long = "from-matrix", value_name = "CSV")]
    pub from_matrix: Option<PathBuf>,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Force coloured output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,
}

impl Args {
    /// Colour preference from the flags, `None` when neither was given
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// The command line layer of the settings
    pub fn settings_layer(&self) -> SettingsBuilder {
        fn non_empty(values: &[String]) -> Option<Vec<String>> {
            (!values.is_empty()).then(|| values.to_vec())
        }

        SettingsBuilder {
            repository: self.repository.clone(),
            analyzer: self.analyzer.clone(),
            extension: self.extension.clone(),
            excluded_dirs: non_empty(&self.exclude_dirs),
            threshold_previous: self.threshold_previous,
            threshold_mean: self.threshold_mean,
            workers: self.workers,
            output_dir: self.output_dir.clone(),
            output_format: self.format.clone(),
            detect_metrics: non_empty(&self.metrics),
            context_metric: self.context_metric.clone(),
            from_matrix: self.from_matrix.clone(),
        }
    }
}

/// Colour is on when forced, or when stdout is a terminal and not disabled
pub fn use_color(preference: Option<bool>) -> bool {
    preference.unwrap_or_else(|| std::io::stdout().is_terminal())
}

/// `none` and `-` disable file logging
pub fn log_file_target(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.eq_ignore_ascii_case("none") && *v != "-")
}
