//! Tests for argument parsing and the command line settings layer

use crate::app::cli::args::*;
use crate::core::settings::SettingsBuilder;
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("repodrift").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_positional_repository_and_defaults() {
    let args = parse(&["/srv/checkouts/project"]);
    assert_eq!(args.repository, Some(PathBuf::from("/srv/checkouts/project")));
    assert_eq!(args.analyzer, None);
    assert!(args.exclude_dirs.is_empty());
    assert_eq!(args.color_override(), None);
}

#[test]
fn test_all_options() {
    let args = parse(&[
        "repo",
        "-a",
        "whitespace",
        "-e",
        "py",
        "--exclude-dir",
        "vendor,node_modules",
        "--exclude-dir",
        "build",
        "--threshold-previous",
        "0.3",
        "--threshold-mean",
        "0.25",
        "-j",
        "4",
        "-o",
        "out",
        "-F",
        "json",
        "-m",
        "blank_space_ratio",
        "--context-metric",
        "max_line_length",
        "--log-level",
        "debug",
        "--no-color",
    ]);
    assert_eq!(args.analyzer.as_deref(), Some("whitespace"));
    assert_eq!(args.exclude_dirs, vec!["vendor", "node_modules", "build"]);
    assert_eq!(args.threshold_previous, Some(0.3));
    assert_eq!(args.workers, Some(4));
    assert_eq!(args.format.as_deref(), Some("json"));
    assert_eq!(args.color_override(), Some(false));

    let settings = SettingsBuilder::new()
        .merge(args.settings_layer())
        .build()
        .unwrap();
    assert_eq!(settings.thresholds.mean, 0.25);
    assert_eq!(settings.excluded_dirs.len(), 3);
    assert_eq!(settings.output_dir, PathBuf::from("out"));
    assert_eq!(settings.context_metric.as_deref(), Some("max_line_length"));
}

#[test]
fn test_unknown_analyzer_is_rejected_by_parser() {
    let result = Args::try_parse_from(["repodrift", "repo", "--analyzer", "astrology"]);
    assert!(result.is_err());
}

#[test]
fn test_color_flags_conflict() {
    let result = Args::try_parse_from(["repodrift", "repo", "--color", "--no-color"]);
    assert!(result.is_err());
}

#[test]
fn test_empty_lists_do_not_override_lower_layers() {
    let layer = parse(&["repo"]).settings_layer();
    assert_eq!(layer.excluded_dirs, None);
    assert_eq!(layer.detect_metrics, None);
}

#[test]
fn test_log_file_target() {
    assert_eq!(log_file_target(Some("run.log")), Some("run.log"));
    assert_eq!(log_file_target(Some("none")), None);
    assert_eq!(log_file_target(Some("-")), None);
    assert_eq!(log_file_target(None), None);
}

#[test]
fn test_use_color_honours_override() {
    assert!(use_color(Some(true)));
    assert!(!use_color(Some(false)));
}
