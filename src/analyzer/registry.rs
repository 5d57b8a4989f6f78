//! Analyzer Registry
//!
//! Maps analyzer names to extractor constructors and metric metadata.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::analyzer::complexity::{self, ComplexityExtractor};
use crate::analyzer::entropy::{self, EntropyExtractor};
use crate::analyzer::insecure::{self, InsecureCallExtractor};
use crate::analyzer::secrets::{self, SecretExtractor};
use crate::analyzer::traits::MetricExtractor;
use crate::analyzer::unicode::{self, UnicodeExtractor};
use crate::analyzer::whitespace::{self, WhitespaceExtractor};

/// Available extractors
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum AnalyzerKind {
    #[default]
    Unicode,
    Whitespace,
    Complexity,
    InsecureCalls,
    Secrets,
    Entropy,
}

impl AnalyzerKind {
    /// Command line names of every analyzer
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(<&'static str>::from).collect()
    }

    pub fn create(self) -> Box<dyn MetricExtractor> {
        match self {
            AnalyzerKind::Unicode => Box::new(UnicodeExtractor::new()),
            AnalyzerKind::Whitespace => Box::new(WhitespaceExtractor),
            AnalyzerKind::Complexity => Box::new(ComplexityExtractor),
            AnalyzerKind::InsecureCalls => Box::new(InsecureCallExtractor),
            AnalyzerKind::Secrets => Box::new(SecretExtractor),
            AnalyzerKind::Entropy => Box::new(EntropyExtractor),
        }
    }

    pub fn metric_names(self) -> &'static [&'static str] {
        match self {
            AnalyzerKind::Unicode => unicode::METRICS,
            AnalyzerKind::Whitespace => whitespace::METRICS,
            AnalyzerKind::Complexity => complexity::METRICS,
            AnalyzerKind::InsecureCalls => insecure::METRICS,
            AnalyzerKind::Secrets => secrets::METRICS,
            AnalyzerKind::Entropy => entropy::METRICS,
        }
    }

    /// Metrics the deviation detector runs on by default
    pub fn primary_metrics(self) -> &'static [&'static str] {
        match self {
            AnalyzerKind::Unicode => &[unicode::HOMOGLYPH_COUNT, unicode::HIDDEN_CHAR_COUNT],
            AnalyzerKind::Whitespace => &[whitespace::BLANK_SPACE_RATIO],
            AnalyzerKind::Complexity => &[complexity::CYCLOMATIC_COMPLEXITY],
            AnalyzerKind::InsecureCalls => &[insecure::INSECURE_CALL_COUNT],
            AnalyzerKind::Secrets => &[secrets::SECRET_COUNT],
            AnalyzerKind::Entropy => &[entropy::SHANNON_ENTROPY],
        }
    }

    /// Secondary metric reported next to each deviation
    pub fn context_metric(self) -> Option<&'static str> {
        match self {
            AnalyzerKind::Unicode => Some(unicode::TOTAL_CHARS),
            AnalyzerKind::Whitespace => Some(whitespace::MAX_LINE_LENGTH),
            AnalyzerKind::Complexity => None,
            AnalyzerKind::InsecureCalls => Some(insecure::HIGH_SEVERITY_COUNT),
            AnalyzerKind::Secrets => Some(secrets::HIGH_SEVERITY_COUNT),
            AnalyzerKind::Entropy => Some(entropy::BYTE_COUNT),
        }
    }
}
