//! Stamps the build time and source revision into the binary as
//! `REPODRIFT_BUILD_TIME` and `REPODRIFT_GIT_REV`.

use std::env;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let git_dir = Path::new(&manifest_dir).join(".git");
    if git_dir.exists() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("refs").display());
    }

    println!("cargo:rustc-env=REPODRIFT_BUILD_TIME={}", build_time());
    println!("cargo:rustc-env=REPODRIFT_GIT_REV={}", git_rev(&manifest_dir));
}

/// Honours `SOURCE_DATE_EPOCH` so packaged builds are reproducible
fn build_time() -> String {
    let stamp = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    stamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn git_rev(manifest_dir: &str) -> String {
    Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .current_dir(manifest_dir)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
