//! Metric Extractor Trait
//!
//! Core contract for per-file analysis plus the shared per-tag aggregation.
//!
//! # Extractor Contract
//!
//! An extractor turns one file into one [`FileAnalysisResult`]. It never
//! returns an error or panics across this boundary for file-level problems:
//! unreadable files are recorded in the result's `error` field and malformed
//! content degrades to a zero-finding result. Extractors hold no mutable
//! state besides optional memoisation, so one instance is shared by every
//! worker of the pool.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::analyzer::types::{FileAnalysisResult, TagAnalysisResult, HIGH_CONFIDENCE_THRESHOLD};

/// Per-file metric extraction
pub trait MetricExtractor: Send + Sync {
    /// Analyzer name as used on the command line
    fn name(&self) -> &'static str;

    /// Metric keys every valid result carries
    fn metric_names(&self) -> &'static [&'static str];

    /// Analyse one file. `file_path` of the result is the given path; the
    /// executor rewrites it to the root-relative path.
    fn analyze_file(&self, path: &Path) -> FileAnalysisResult;
}

/// Fold one tag's file results into a [`TagAnalysisResult`]
///
/// Failed results are kept but excluded from every count except
/// `files_failed`.
pub fn aggregate(
    tag_name: &str,
    file_results: Vec<FileAnalysisResult>,
    processing_time: Duration,
) -> TagAnalysisResult {
    let (mut files_analyzed, mut total_anomalies, mut high_confidence) = (0, 0, 0);
    for result in file_results.iter().filter(|r| r.is_valid()) {
        files_analyzed += 1;
        total_anomalies += result.anomalies.len();
        if result.confidence_score > HIGH_CONFIDENCE_THRESHOLD && !result.anomalies.is_empty() {
            high_confidence += 1;
        }
    }

    TagAnalysisResult {
        tag_name: tag_name.to_string(),
        files_analyzed,
        files_failed: file_results.len() - files_analyzed,
        total_anomalies,
        high_confidence_anomalies: high_confidence,
        processing_time,
        file_results,
    }
}

/// Read a file as text, silently dropping invalid UTF-8 sequences
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect())
}

/// Run `analyze` over the file's text, timing it and capturing read errors
pub fn analyze_text<F>(path: &Path, analyze: F) -> FileAnalysisResult
where
    F: FnOnce(&str, &mut FileAnalysisResult),
{
    let started = Instant::now();
    let mut result = FileAnalysisResult::new(path.to_string_lossy());
    match read_text(path) {
        Ok(text) => analyze(&text, &mut result),
        Err(e) => result.error = Some(format!("Failed to read file: {}", e)),
    }
    result.processing_time = started.elapsed();
    result
}

/// Like [`analyze_text`] for extractors that work on raw bytes
pub fn analyze_bytes<F>(path: &Path, analyze: F) -> FileAnalysisResult
where
    F: FnOnce(&[u8], &mut FileAnalysisResult),
{
    let started = Instant::now();
    let mut result = FileAnalysisResult::new(path.to_string_lossy());
    match std::fs::read(path) {
        Ok(bytes) => analyze(&bytes, &mut result),
        Err(e) => result.error = Some(format!("Failed to read file: {}", e)),
    }
    result.processing_time = started.elapsed();
    result
}
