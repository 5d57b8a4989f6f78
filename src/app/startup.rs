//! Application startup
//!
//! Resolves settings (defaults < configuration file < command line), starts
//! logging, then either walks the repository history or re-runs detection on
//! an exported metric table.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clap::Parser;

use crate::app::cli::args::{log_file_target, use_color, Args};
use crate::app::cli::config::load_config;
use crate::app::error::{AppError, AppResult};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::settings::{AnalysisSettings, SettingsBuilder};
use crate::core::version;
use crate::detector::deviation::DeviationDetector;
use crate::executor::ParallelExecutor;
use crate::export::report::{print_deviations, print_summary};
use crate::export::{csv, ExportError, Exporter};
use crate::pipeline::AnalysisPipeline;
use crate::scanner::{FileCollector, GitVersionWalker};

/// Parse the process arguments, run, and return the exit code
pub fn startup() -> i32 {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => 0,
        Err(AppError::Logging { message }) => {
            eprintln!("repodrift: failed to initialise logging: {}", message);
            1
        }
        Err(e) => {
            log_error_with_context(&e, "Analysis run failed");
            e.exit_code()
        }
    }
}

/// One complete run for already parsed arguments
pub fn run(args: &Args) -> AppResult<()> {
    // logging must be up before a configuration error can be reported
    let config = load_config(args.config_file.as_deref());
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let color = use_color(args.color_override().or(logging.color));
    init_logging(
        args.log_level.as_deref().or(logging.level.as_deref()),
        args.log_format.as_deref().or(logging.format.as_deref()),
        log_file_target(args.log_file.as_deref().or(logging.file.as_deref())),
        color,
    )
    .map_err(|e| AppError::Logging {
        message: e.to_string(),
    })?;
    colored::control::set_override(color);

    let config = config?;
    if let Some(path) = &config.path {
        log::debug!("Configuration loaded from {}", path.display());
    }
    let settings = SettingsBuilder::new()
        .merge(config.settings)
        .merge(args.settings_layer())
        .build()?;
    log::info!("repodrift {}", version::long_version());
    log::debug!("Settings: {:?}", settings);

    match &settings.from_matrix {
        Some(path) => reanalyse_matrix(&settings, path, color),
        None => analyse_history(&settings, color),
    }
}

fn analyse_history(settings: &AnalysisSettings, color: bool) -> AppResult<()> {
    log::info!(
        "Running '{}' over the tags of {} with {} worker(s)",
        settings.analyzer,
        settings.repository.display(),
        settings.workers
    );

    let mut walker = GitVersionWalker::open(&settings.repository)?;
    let collector = FileCollector::new(settings.extension.clone(), settings.excluded_dirs.clone());
    let executor = ParallelExecutor::new(settings.workers)?;
    let extractor = settings.analyzer.create();

    let run = AnalysisPipeline::new(&mut walker, &collector, &executor, extractor.as_ref()).run()?;

    let detector = DeviationDetector::new(settings.thresholds);
    let deviations = run.deviations(
        &detector,
        &settings.detect_metrics,
        settings.context_metric.as_deref(),
    );

    let exporter = Exporter::new(
        &settings.output_dir,
        &settings.analyzer.to_string(),
        settings.output_format,
    );
    log::info!("Writing results to {}", exporter.output_dir().display());
    exporter.write_results(&run, settings.analyzer.metric_names())?;
    exporter.write_deviations(&deviations, &settings.thresholds)?;

    print_summary(&run, color);
    print_deviations(&deviations, color);
    Ok(())
}

/// Detection only, on a table written by an earlier run
fn reanalyse_matrix(settings: &AnalysisSettings, path: &Path, color: bool) -> AppResult<()> {
    let metric = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "metric".to_string());
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    let matrix = csv::read_matrix(&metric, BufReader::new(file))?;
    log::info!(
        "Loaded {} file(s) across {} tag(s) from {}",
        matrix.rows.len(),
        matrix.tags.len(),
        path.display()
    );
    if matrix.is_empty() {
        log::warn!("{} holds no values; nothing to compare", path.display());
    }

    let deviations = DeviationDetector::new(settings.thresholds).detect(&matrix);
    Exporter::new(&settings.output_dir, &metric, settings.output_format)
        .write_deviations(&deviations, &settings.thresholds)?;
    print_deviations(&deviations, color);
    Ok(())
}
