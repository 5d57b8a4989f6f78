//! Result Export
//!
//! Writes the per-metric matrices, the full results and the deviation
//! report below one output directory:
//!
//! | format | files |
//! |--------|-------|
//! | csv    | `<analyzer>_<metric>.csv` per metric, `<analyzer>_deviations.csv` |
//! | json   | `<analyzer>_results.json`, `<analyzer>_deviations.json` |
//!
//! A plain-text `<analyzer>_deviations.txt` is written in both cases.

pub mod csv;
pub mod error;
pub mod json;
pub mod report;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::detector::deviation::{Deviation, Thresholds};
use crate::pipeline::HistoryRun;

pub use error::{ExportError, ExportResult};

/// Machine-readable output format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn file_ext(self) -> &'static str {
        self.into()
    }
}

/// Writes one run's outputs into `output_dir`
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    analyzer: String,
    prefix: String,
    format: ExportFormat,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, analyzer: &str, format: ExportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            analyzer: analyzer.to_string(),
            prefix: analyzer.replace('-', "_"),
            format,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn path(&self, stem: &str, ext: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", self.prefix, stem, ext))
    }

    fn create(&self, path: &Path) -> ExportResult<BufWriter<File>> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ExportError::io(&self.output_dir, e))?;
        let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
        Ok(BufWriter::new(file))
    }

    fn finish(path: &Path, mut writer: BufWriter<File>) -> ExportResult<PathBuf> {
        writer.flush().map_err(|e| ExportError::io(path, e))?;
        log::info!(" -> {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Per-metric matrices (csv) or the full result document (json)
    pub fn write_results(&self, run: &HistoryRun, metrics: &[&str]) -> ExportResult<Vec<PathBuf>> {
        match self.format {
            ExportFormat::Csv => metrics
                .iter()
                .map(|metric| {
                    let path = self.path(metric, "csv");
                    let mut writer = self.create(&path)?;
                    csv::write_matrix(&run.matrix(metric), &mut writer)?;
                    Self::finish(&path, writer)
                })
                .collect(),
            ExportFormat::Json => {
                let path = self.path("results", "json");
                let mut writer = self.create(&path)?;
                json::write_results(run, &self.analyzer, &mut writer)?;
                Ok(vec![Self::finish(&path, writer)?])
            }
        }
    }

    /// Deviation report in the configured format plus the text rendering
    pub fn write_deviations(
        &self,
        deviations: &[Deviation],
        thresholds: &Thresholds,
    ) -> ExportResult<Vec<PathBuf>> {
        let structured = self.path("deviations", self.format.file_ext());
        let mut writer = self.create(&structured)?;
        match self.format {
            ExportFormat::Csv => csv::write_deviations(deviations, &mut writer)?,
            ExportFormat::Json => {
                json::write_deviations(deviations, thresholds, &self.analyzer, &mut writer)?
            }
        }
        let structured = Self::finish(&structured, writer)?;

        let text = self.path("deviations", "txt");
        let mut writer = self.create(&text)?;
        writer
            .write_all(report::render_deviations(deviations).as_bytes())
            .map_err(|e| ExportError::io(&text, e))?;
        let text = Self::finish(&text, writer)?;

        Ok(vec![structured, text])
    }
}
