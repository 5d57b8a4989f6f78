//! Whitespace Ratio Extractor
//!
//! Whitespace-padded payloads push code far to the right of the visible
//! screen. Such padding moves both the blank ratio and the longest line.

use std::path::Path;

use crate::analyzer::traits::{analyze_text, MetricExtractor};
use crate::analyzer::types::FileAnalysisResult;

pub const BLANK_SPACE_RATIO: &str = "blank_space_ratio";
pub const MAX_LINE_LENGTH: &str = "max_line_length";

pub const METRICS: &[&str] = &[BLANK_SPACE_RATIO, MAX_LINE_LENGTH];

#[derive(Debug, Default)]
pub struct WhitespaceExtractor;

impl WhitespaceExtractor {
    pub fn analyze_str(&self, text: &str, result: &mut FileAnalysisResult) {
        let (mut total, mut blanks) = (0usize, 0usize);
        for c in text.chars() {
            total += 1;
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                blanks += 1;
            }
        }
        let max_line = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);

        result
            .metrics
            .insert(BLANK_SPACE_RATIO.into(), blank_space_ratio(blanks, total));
        result.metrics.insert(MAX_LINE_LENGTH.into(), max_line as f64);
    }
}

/// `blanks / total`, 0.0 for an empty file
pub fn blank_space_ratio(blanks: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        blanks as f64 / total as f64
    }
}

impl MetricExtractor for WhitespaceExtractor {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn metric_names(&self) -> &'static [&'static str] {
        METRICS
    }

    fn analyze_file(&self, path: &Path) -> FileAnalysisResult {
        analyze_text(path, |text, result| self.analyze_str(text, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> FileAnalysisResult {
        let mut result = FileAnalysisResult::new("a.py");
        WhitespaceExtractor.analyze_str(text, &mut result);
        result
    }

    #[test]
    fn test_ratio_counts_space_tab_and_newlines() {
        let result = analyze("a b\tc\r\n");
        // 7 chars, 4 blanks
        assert_eq!(result.metric(BLANK_SPACE_RATIO), Some(4.0 / 7.0));
        assert_eq!(result.metric(MAX_LINE_LENGTH), Some(5.0));
    }

    #[test]
    fn test_empty_file_has_zero_ratio() {
        let result = analyze("");
        assert_eq!(result.metric(BLANK_SPACE_RATIO), Some(0.0));
        assert_eq!(result.metric(MAX_LINE_LENGTH), Some(0.0));
    }

    #[test]
    fn test_ratio_stays_bounded() {
        assert_eq!(analyze("    ").metric(BLANK_SPACE_RATIO), Some(1.0));
        assert_eq!(analyze("abcd").metric(BLANK_SPACE_RATIO), Some(0.0));
    }

    #[test]
    fn test_padding_moves_both_metrics() {
        let clean = analyze("import os\nprint(os.name)\n");
        let padded = format!(
            "import os\nprint(os.name){}exec('payload')\n",
            " ".repeat(200)
        );
        let padded = analyze(&padded);
        assert!(padded.metric(BLANK_SPACE_RATIO) > clean.metric(BLANK_SPACE_RATIO));
        assert!(padded.metric(MAX_LINE_LENGTH).unwrap() > 200.0);
    }
}
