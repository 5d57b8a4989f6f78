//! Analyzer Component
//!
//! Per-file metric extractors sharing the [`MetricExtractor`] contract, and
//! the per-tag aggregation every extractor feeds into.
//!
//! - **unicode**: homoglyph and hidden character counts
//! - **whitespace**: blank ratio and longest line
//! - **complexity**: decision-point based cyclomatic complexity
//! - **insecure-calls**: dangerous call pattern table
//! - **secrets**: hardcoded credential regexes
//! - **entropy**: Shannon entropy of the raw bytes

pub mod complexity;
pub mod entropy;
pub mod insecure;
pub mod registry;
pub mod secrets;
pub mod traits;
pub mod types;
pub mod unicode;
pub mod whitespace;

pub use registry::AnalyzerKind;
pub use traits::{aggregate, MetricExtractor};
pub use types::{Anomaly, FileAnalysisResult, Location, Severity, TagAnalysisResult};
