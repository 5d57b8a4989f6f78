//! Analyzer Types
//!
//! Per-file and per-tag results produced by every extractor.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Confidence above which a file counts as a high-confidence finding
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Severity of a pattern finding
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// File confidence contributed by the worst finding of this severity
    pub fn confidence(self) -> f64 {
        match self {
            Severity::High => 0.9,
            Severity::Medium => 0.6,
            Severity::Low => 0.3,
        }
    }
}

/// Where in a file an anomaly was found
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// Whole-file property
    File,
    /// 1-based line number
    Line { line: usize },
    /// A distinct character and how often it occurs in the file
    CodePoint { code_point: u32, occurrences: usize },
}

/// One finding inside a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Finding type (`homoglyph`, `hidden`, `secret`, ...)
    pub kind: String,
    /// Classification or severity label
    pub category: String,
    pub location: Location,
    pub detail: String,
}

impl Anomaly {
    pub fn new(
        kind: impl Into<String>,
        category: impl Into<String>,
        location: Location,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            category: category.into(),
            location,
            detail: detail.into(),
        }
    }
}

/// Outcome of analysing one file at one tag
///
/// Exactly one is produced for every collected file. A failed analysis keeps
/// whatever metrics were computed before the failure and sets `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysisResult {
    /// Root-relative path once the executor has stamped it
    pub file_path: String,
    pub metrics: BTreeMap<String, f64>,
    pub anomalies: Vec<Anomaly>,
    /// Bounded to [0, 1]
    pub confidence_score: f64,
    #[serde(rename = "processing_time_secs", serialize_with = "serialize_secs")]
    pub processing_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileAnalysisResult {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            metrics: BTreeMap::new(),
            anomalies: Vec::new(),
            confidence_score: 0.0,
            processing_time: Duration::ZERO,
            error: None,
        }
    }

    /// Result carrying only an error
    pub fn failed(file_path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(file_path)
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of one tag's file results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagAnalysisResult {
    pub tag_name: String,
    /// Files analysed without error
    pub files_analyzed: usize,
    pub files_failed: usize,
    /// Anomalies summed over valid results
    pub total_anomalies: usize,
    /// Valid files with confidence above 0.7 and at least one anomaly
    pub high_confidence_anomalies: usize,
    #[serde(rename = "processing_time_secs", serialize_with = "serialize_secs")]
    pub processing_time: Duration,
    /// Every file result of the tag, failed ones included
    pub file_results: Vec<FileAnalysisResult>,
}

impl TagAnalysisResult {
    pub fn valid_results(&self) -> impl Iterator<Item = &FileAnalysisResult> {
        self.file_results.iter().filter(|r| r.is_valid())
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &FileAnalysisResult> {
        self.file_results.iter().filter(|r| !r.is_valid())
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_and_confidence() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::High.confidence(), 0.9);
        assert_eq!(Severity::Low.to_string(), "low");
    }

    #[test]
    fn test_failed_result_is_invalid() {
        let result = FileAnalysisResult::failed("a.py", "permission denied");
        assert!(!result.is_valid());
        assert!(result.metrics.is_empty());
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn test_serialized_shape() {
        let result = FileAnalysisResult::new("src/a.py").with_metric("homoglyph_count", 2.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["file_path"], "src/a.py");
        assert_eq!(json["metrics"]["homoglyph_count"], 2.0);
        assert_eq!(json["processing_time_secs"], 0.0);
        assert!(json.get("error").is_none());
    }
}
