//! Exported tables read back into the detector

mod common;

use std::collections::BTreeSet;
use std::fs::File;

use common::{whitespace_payload, InjectionFixture, CLEAN_MODULE};
use repodrift::analyzer::registry::AnalyzerKind;
use repodrift::detector::DeviationDetector;
use repodrift::executor::ParallelExecutor;
use repodrift::export::{csv, ExportFormat, Exporter};
use repodrift::pipeline::{AnalysisPipeline, HistoryRun};
use repodrift::scanner::{FileCollector, GitVersionWalker};
use serial_test::serial;
use tempfile::TempDir;

fn whitespace_history(fixture: &InjectionFixture) -> HistoryRun {
    let mut walker = GitVersionWalker::open(fixture.path()).unwrap();
    let collector = FileCollector::new(Some("py".to_string()), BTreeSet::new());
    let executor = ParallelExecutor::new(2).unwrap();
    let extractor = AnalyzerKind::Whitespace.create();
    AnalysisPipeline::new(&mut walker, &collector, &executor, extractor.as_ref())
        .run()
        .unwrap()
}

#[test]
#[serial]
fn test_exported_matrices_reload_identically() {
    let mut fixture = InjectionFixture::new();
    fixture
        .pre_tag(&[("app.py", CLEAN_MODULE)], 3)
        .inject("lib/new.py", &whitespace_payload("x = 1\n"));
    let run = whitespace_history(&fixture);

    let out = TempDir::new().unwrap();
    let exporter = Exporter::new(out.path(), "whitespace", ExportFormat::Csv);
    let metrics = AnalyzerKind::Whitespace.metric_names();
    let written = exporter.write_results(&run, metrics).unwrap();
    assert_eq!(written.len(), metrics.len());

    for (metric, path) in metrics.iter().zip(&written) {
        let reloaded = csv::read_matrix(metric, File::open(path).unwrap()).unwrap();
        assert_eq!(reloaded, run.matrix(metric));
    }

    // the new file has no value before it appeared, and that stays empty
    let reloaded = csv::read_matrix("blank_space_ratio", File::open(&written[0]).unwrap()).unwrap();
    assert_eq!(reloaded.get("lib/new.py", 0), None);
    assert!(reloaded.get("lib/new.py", 3).is_some());
}

#[test]
#[serial]
fn test_detection_on_reloaded_matrix_matches_live_run() {
    let mut fixture = InjectionFixture::new();
    fixture
        .pre_tag(&[("app.py", CLEAN_MODULE)], 3)
        .inject("app.py", &whitespace_payload(CLEAN_MODULE));
    let run = whitespace_history(&fixture);
    let detector = DeviationDetector::default();

    let out = TempDir::new().unwrap();
    let exporter = Exporter::new(out.path(), "whitespace", ExportFormat::Csv);
    let written = exporter.write_results(&run, &["blank_space_ratio"]).unwrap();
    let reloaded = csv::read_matrix("blank_space_ratio", File::open(&written[0]).unwrap()).unwrap();

    let live = detector.detect(&run.matrix("blank_space_ratio"));
    let replayed = detector.detect(&reloaded);
    assert_eq!(live.len(), 1);
    assert_eq!(
        serde_json::to_value(&live).unwrap(),
        serde_json::to_value(&replayed).unwrap()
    );
}

#[test]
#[serial]
fn test_json_results_and_deviation_report() {
    let mut fixture = InjectionFixture::new();
    fixture
        .pre_tag(&[("app.py", CLEAN_MODULE)], 2)
        .inject("app.py", &whitespace_payload(CLEAN_MODULE));
    let run = whitespace_history(&fixture);
    let detector = DeviationDetector::default();
    let deviations = run.deviations(&detector, &["blank_space_ratio"], Some("max_line_length"));

    let out = TempDir::new().unwrap();
    let exporter = Exporter::new(out.path(), "whitespace", ExportFormat::Json);
    exporter.write_results(&run, &[]).unwrap();
    let written = exporter.write_deviations(&deviations, detector.thresholds()).unwrap();

    let results: serde_json::Value =
        serde_json::from_reader(File::open(out.path().join("whitespace_results.json")).unwrap())
            .unwrap();
    assert_eq!(results["results"].as_array().unwrap().len(), 3);
    assert!(results["schema_version"].as_u64().unwrap() > 0);

    let report: serde_json::Value = serde_json::from_reader(File::open(&written[0]).unwrap()).unwrap();
    assert_eq!(report["deviations"].as_array().unwrap().len(), 1);
    assert_eq!(report["deviations"][0]["file_path"], "app.py");

    let text = std::fs::read_to_string(&written[1]).unwrap();
    assert!(text.contains("app.py"));
    assert!(text.contains("v0.2"));
}
