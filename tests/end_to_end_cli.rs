//! Full command line run
//!
//! Kept to a single test: the process-wide logger can only be started once.

mod common;

use clap::Parser;
use common::{whitespace_payload, InjectionFixture, CLEAN_MODULE};
use repodrift::app::cli::Args;
use repodrift::app::startup::run;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_run_writes_every_output() {
    let mut fixture = InjectionFixture::new();
    fixture
        .pre_tag(&[("app.py", CLEAN_MODULE)], 3)
        .inject("app.py", &whitespace_payload(CLEAN_MODULE));
    let out = TempDir::new().unwrap();
    let config = out.path().join("repodrift.toml");
    std::fs::write(&config, "analyzer = \"whitespace\"\nextension = \"py\"\n").unwrap();

    let repo = fixture.path().to_string_lossy().to_string();
    let out_dir = out.path().join("report");
    let args = Args::try_parse_from([
        "repodrift",
        repo.as_str(),
        "--config-file",
        config.to_str().unwrap(),
        "--output-dir",
        out_dir.to_str().unwrap(),
        "--workers",
        "2",
        "--log-level",
        "warn",
        "--no-color",
    ])
    .unwrap();

    run(&args).unwrap();

    for name in [
        "whitespace_blank_space_ratio.csv",
        "whitespace_max_line_length.csv",
        "whitespace_deviations.csv",
        "whitespace_deviations.txt",
    ] {
        assert!(out_dir.join(name).is_file(), "{} missing", name);
    }
    let deviations = std::fs::read_to_string(out_dir.join("whitespace_deviations.csv")).unwrap();
    let rows: Vec<&str> = deviations.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].starts_with("app.py,blank_space_ratio,v0.3,v0.4,"));
}
