//! Unicode Anomaly Extractor
//!
//! Flags characters from scripts other than Latin (homoglyph candidates) and
//! invisible or unassigned code points (hidden characters).
//!
//! Each distinct character of a file is classified once, then weighted by its
//! occurrence count. Classifications are memoised in a [`CharClassifier`]
//! shared by all workers; a classification depends only on the character, so
//! concurrent duplicate inserts are harmless.

use std::collections::BTreeMap;
use std::path::Path;

use dashmap::DashMap;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_script::{Script, UnicodeScript};

use crate::analyzer::traits::{analyze_text, MetricExtractor};
use crate::analyzer::types::{Anomaly, FileAnalysisResult, Location};

pub const TOTAL_CHARS: &str = "total_chars";
pub const HOMOGLYPH_COUNT: &str = "homoglyph_count";
pub const HIDDEN_CHAR_COUNT: &str = "hidden_char_count";

pub const METRICS: &[&str] = &[TOTAL_CHARS, HOMOGLYPH_COUNT, HIDDEN_CHAR_COUNT];

/// Classification of one character along both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharClass {
    /// Script name when the character belongs to a non-Latin script
    pub confusable_script: Option<&'static str>,
    /// General category code when the character is hidden
    pub hidden_category: Option<&'static str>,
}

impl CharClass {
    pub fn is_flagged(&self) -> bool {
        self.confusable_script.is_some() || self.hidden_category.is_some()
    }
}

/// Memoising character classifier
#[derive(Debug, Default)]
pub struct CharClassifier {
    cache: DashMap<char, CharClass>,
}

impl CharClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, c: char) -> CharClass {
        if let Some(class) = self.cache.get(&c) {
            return *class;
        }
        let class = CharClass {
            confusable_script: confusable_script(c),
            hidden_category: hidden_category(c),
        };
        self.cache.insert(c, class);
        class
    }

    /// Number of distinct characters classified so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Script name of `c` unless it is Latin or shared punctuation
fn confusable_script(c: char) -> Option<&'static str> {
    match c.script() {
        Script::Latin | Script::Common | Script::Unknown => None,
        script => Some(script.full_name()),
    }
}

/// General category code of invisible, control, unassigned and private-use
/// characters; ordinary whitespace controls are exempt
fn hidden_category(c: char) -> Option<&'static str> {
    if matches!(c, '\t' | '\n' | '\r' | '\x0b' | '\x0c') {
        return None;
    }
    match get_general_category(c) {
        GeneralCategory::Format => Some("Cf"),
        GeneralCategory::Control => Some("Cc"),
        GeneralCategory::Unassigned => Some("Cn"),
        GeneralCategory::PrivateUse => Some("Co"),
        _ => None,
    }
}

/// Homoglyph and hidden character extractor
#[derive(Debug, Default)]
pub struct UnicodeExtractor {
    classifier: CharClassifier,
}

impl UnicodeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(&self) -> &CharClassifier {
        &self.classifier
    }

    /// Fill `result` from already-decoded text
    pub fn analyze_str(&self, text: &str, result: &mut FileAnalysisResult) {
        let mut occurrences: BTreeMap<char, usize> = BTreeMap::new();
        for c in text.chars() {
            *occurrences.entry(c).or_default() += 1;
        }

        let total: usize = occurrences.values().sum();
        let (mut homoglyphs, mut hidden) = (0usize, 0usize);
        for (&c, &count) in &occurrences {
            let class = self.classifier.classify(c);
            let location = Location::CodePoint {
                code_point: c as u32,
                occurrences: count,
            };
            if let Some(script) = class.confusable_script {
                homoglyphs += count;
                result.anomalies.push(Anomaly::new(
                    "homoglyph",
                    script,
                    location.clone(),
                    format!("'{}' (U+{:04X}) x{}", c, c as u32, count),
                ));
            }
            if let Some(category) = class.hidden_category {
                hidden += count;
                result.anomalies.push(Anomaly::new(
                    "hidden",
                    category,
                    location,
                    format!("U+{:04X} x{}", c as u32, count),
                ));
            }
        }

        result.metrics.insert(TOTAL_CHARS.into(), total as f64);
        result.metrics.insert(HOMOGLYPH_COUNT.into(), homoglyphs as f64);
        result.metrics.insert(HIDDEN_CHAR_COUNT.into(), hidden as f64);
        result.confidence_score = density_confidence(homoglyphs + hidden, total);
    }
}

/// `min(1, flagged / total * 100)`, zero without findings
pub fn density_confidence(flagged: usize, total: usize) -> f64 {
    if total == 0 || flagged == 0 {
        return 0.0;
    }
    (flagged as f64 / total as f64 * 100.0).min(1.0)
}

impl MetricExtractor for UnicodeExtractor {
    fn name(&self) -> &'static str {
        "unicode"
    }

    fn metric_names(&self) -> &'static [&'static str] {
        METRICS
    }

    fn analyze_file(&self, path: &Path) -> FileAnalysisResult {
        analyze_text(path, |text, result| self.analyze_str(text, result))
    }
}
