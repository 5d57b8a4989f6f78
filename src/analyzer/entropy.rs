//! Shannon entropy of the raw file bytes
//!
//! Packed or encrypted payloads push a source file's entropy towards 8 bits
//! per byte.

use std::path::Path;

use crate::analyzer::traits::{analyze_bytes, MetricExtractor};
use crate::analyzer::types::FileAnalysisResult;

pub const SHANNON_ENTROPY: &str = "shannon_entropy";
pub const BYTE_COUNT: &str = "byte_count";

pub const METRICS: &[&str] = &[SHANNON_ENTROPY, BYTE_COUNT];

#[derive(Debug, Default)]
pub struct EntropyExtractor;

/// Bits per byte, 0.0 for empty input
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    let total = data.len() as f64;
    counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

impl MetricExtractor for EntropyExtractor {
    fn name(&self) -> &'static str {
        "entropy"
    }

    fn metric_names(&self) -> &'static [&'static str] {
        METRICS
    }

    fn analyze_file(&self, path: &Path) -> FileAnalysisResult {
        analyze_bytes(path, |bytes, result| {
            result
                .metrics
                .insert(SHANNON_ENTROPY.into(), shannon_entropy(bytes));
            result.metrics.insert(BYTE_COUNT.into(), bytes.len() as f64);
        })
    }
}
