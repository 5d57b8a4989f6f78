//! Cyclomatic Complexity Extractor
//!
//! Language-agnostic approximation: decision-point keywords and operators
//! are counted after comments and string literals have been blanked out.
//! Complexity is `1 + decision points` for the whole file.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzer::traits::{analyze_text, MetricExtractor};
use crate::analyzer::types::FileAnalysisResult;

pub const CYCLOMATIC_COMPLEXITY: &str = "cyclomatic_complexity";
pub const DECISION_POINTS: &str = "decision_points";

pub const METRICS: &[&str] = &[CYCLOMATIC_COMPLEXITY, DECISION_POINTS];

static DECISION_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:if|elif|for|while|case|catch|except|and|or|assert)\b|&&|\|\|")
        .expect("valid regex literal")
});

#[derive(Debug, Default)]
pub struct ComplexityExtractor;

impl ComplexityExtractor {
    pub fn analyze_str(&self, text: &str, result: &mut FileAnalysisResult) {
        let code = strip_comments_and_strings(text);
        let points = count_decision_points(&code);
        result
            .metrics
            .insert(CYCLOMATIC_COMPLEXITY.into(), (1 + points) as f64);
        result.metrics.insert(DECISION_POINTS.into(), points as f64);
    }
}

/// Decision points in code that has no comments or strings left
pub fn count_decision_points(code: &str) -> usize {
    let keywords = DECISION_KEYWORDS.find_iter(code).count();
    keywords + count_ternaries(code)
}

/// `?` used as a conditional; `?.` and `??` are not branches
fn count_ternaries(code: &str) -> usize {
    let bytes = code.as_bytes();
    (0..bytes.len())
        .filter(|&i| {
            bytes[i] == b'?'
                && (i == 0 || bytes[i - 1] != b'?')
                && !matches!(bytes.get(i + 1), Some(b'.') | Some(b'?'))
        })
        .count()
}

#[derive(Clone, Copy, PartialEq)]
enum Scan {
    Code,
    LineComment,
    BlockComment,
    Str(char),
}

/// Replace comments (`//`, `#`, `/* */`) and quoted strings with spaces,
/// keeping line structure. Single-quoted literals end at the line end.
pub fn strip_comments_and_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = Scan::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = Scan::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                }
                '#' => state = Scan::LineComment,
                '"' | '\'' | '`' => state = Scan::Str(c),
                _ => {
                    out.push(c);
                    continue;
                }
            },
            Scan::LineComment if c == '\n' => state = Scan::Code,
            Scan::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                state = Scan::Code;
            }
            Scan::Str(_) if c == '\\' => {
                out.push(' ');
                if let Some(escaped) = chars.next() {
                    // line continuation inside a literal still ends a line
                    out.push(if escaped == '\n' { '\n' } else { ' ' });
                }
                continue;
            }
            Scan::Str(quote) if c == quote => state = Scan::Code,
            Scan::Str('\'') if c == '\n' => state = Scan::Code,
            _ => {}
        }
        out.push(if c == '\n' { '\n' } else { ' ' });
    }
    out
}

impl MetricExtractor for ComplexityExtractor {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn metric_names(&self) -> &'static [&'static str] {
        METRICS
    }

    fn analyze_file(&self, path: &Path) -> FileAnalysisResult {
        analyze_text(path, |text, result| self.analyze_str(text, result))
    }
}
