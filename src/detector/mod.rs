//! Deviation Detector
//!
//! Assembles sparse per-file series from the per-tag results and flags the
//! jumps that exceed both the previous-tag and the historical-mean threshold.

pub mod deviation;
pub mod series;

pub use deviation::{Comparison, ContextDelta, Deviation, DeviationDetector, Thresholds};
pub use series::{MetricMatrix, MetricSeries};
