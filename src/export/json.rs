//! JSON exports
//!
//! Full per-tag results and the deviation list, each wrapped in a small
//! envelope carrying the report schema version.

use std::io::Write;

use serde::Serialize;

use crate::core::version;
use crate::detector::deviation::{Deviation, Thresholds};
use crate::export::error::ExportResult;
use crate::pipeline::HistoryRun;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: u32,
    generated_at: String,
    analyzer: &'a str,
    #[serde(flatten)]
    body: T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(analyzer: &'a str, body: T) -> Self {
        Self {
            schema_version: version::report_schema_version(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            analyzer,
            body,
        }
    }
}

#[derive(Serialize)]
struct DeviationBody<'a> {
    thresholds: &'a Thresholds,
    deviations: &'a [Deviation],
}

/// Every tag's file results, skipped tags included
pub fn write_results<W: Write>(run: &HistoryRun, analyzer: &str, writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, &Envelope::new(analyzer, run))?;
    Ok(())
}

/// Flagged deviations; values are finite by construction
pub fn write_deviations<W: Write>(
    deviations: &[Deviation],
    thresholds: &Thresholds,
    analyzer: &str,
    writer: W,
) -> ExportResult<()> {
    let body = DeviationBody {
        thresholds,
        deviations,
    };
    serde_json::to_writer_pretty(writer, &Envelope::new(analyzer, body))?;
    Ok(())
}
