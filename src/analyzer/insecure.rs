//! Insecure Call Extractor
//!
//! Matches calls to dangerous functions against a fixed pattern table after
//! comments and string literals are blanked out. Bare names (`eval`) only
//! match unqualified calls; dotted patterns match on the last module segment
//! (`ElementTree.parse`).

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzer::complexity::strip_comments_and_strings;
use crate::analyzer::traits::{analyze_text, MetricExtractor};
use crate::analyzer::types::{Anomaly, FileAnalysisResult, Location, Severity};

pub const INSECURE_CALL_COUNT: &str = "insecure_call_count";
pub const HIGH_SEVERITY_COUNT: &str = "high_severity_count";
pub const MEDIUM_SEVERITY_COUNT: &str = "medium_severity_count";
pub const LOW_SEVERITY_COUNT: &str = "low_severity_count";

pub const METRICS: &[&str] = &[
    INSECURE_CALL_COUNT,
    HIGH_SEVERITY_COUNT,
    MEDIUM_SEVERITY_COUNT,
    LOW_SEVERITY_COUNT,
];

/// One row of the pattern table
#[derive(Debug, Clone, Copy)]
pub struct CallPattern {
    pub module: Option<&'static str>,
    pub function: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    /// Keyword argument that must be set to `True` on the same line
    pub required_flag: Option<&'static str>,
}

const fn call(
    module: Option<&'static str>,
    function: &'static str,
    severity: Severity,
    description: &'static str,
) -> CallPattern {
    CallPattern {
        module,
        function,
        severity,
        description,
        required_flag: None,
    }
}

const fn call_with_flag(
    module: &'static str,
    function: &'static str,
    flag: &'static str,
    description: &'static str,
) -> CallPattern {
    CallPattern {
        module: Some(module),
        function,
        severity: Severity::High,
        description,
        required_flag: Some(flag),
    }
}

pub const CALL_PATTERNS: &[CallPattern] = &[
    // code execution
    call(None, "eval", Severity::High, "arbitrary code execution"),
    call(None, "exec", Severity::High, "arbitrary code execution"),
    call(Some("pickle"), "load", Severity::High, "unsafe deserialisation"),
    call(Some("pickle"), "loads", Severity::High, "unsafe deserialisation"),
    call(Some("marshal"), "loads", Severity::High, "unsafe deserialisation"),
    call(Some("yaml"), "load", Severity::High, "unsafe deserialisation without SafeLoader"),
    // command injection
    call_with_flag("subprocess", "Popen", "shell", "command injection via shell=True"),
    call_with_flag("subprocess", "run", "shell", "command injection via shell=True"),
    call_with_flag("subprocess", "call", "shell", "command injection via shell=True"),
    call(Some("os"), "system", Severity::High, "command injection"),
    call(Some("os"), "popen", Severity::High, "command injection"),
    call(Some("commands"), "getoutput", Severity::High, "command injection"),
    call(Some("commands"), "getstatusoutput", Severity::High, "command injection"),
    // XML external entities
    call(Some("xml.etree.ElementTree"), "parse", Severity::High, "XXE with untrusted input"),
    call(Some("xml.etree.ElementTree"), "fromstring", Severity::High, "XXE with untrusted input"),
    call(Some("xml.sax"), "parse", Severity::High, "XXE with untrusted input"),
    call(Some("xml.dom.minidom"), "parse", Severity::High, "XXE with untrusted input"),
    call(Some("xml.dom.pulldom"), "parseString", Severity::High, "XXE with untrusted input"),
    // weak crypto and races
    call(Some("hashlib"), "md5", Severity::High, "weak hash"),
    call(Some("hashlib"), "sha1", Severity::High, "weak hash"),
    call(Some("tempfile"), "mktemp", Severity::High, "temporary file race"),
    // network
    call(Some("urllib.request"), "urlopen", Severity::Medium, "possible SSRF"),
    call(Some("requests"), "get", Severity::Medium, "possible SSRF"),
    call(Some("requests"), "post", Severity::Medium, "possible SSRF"),
    call(Some("requests"), "put", Severity::Medium, "possible SSRF"),
    call(Some("requests"), "delete", Severity::Medium, "possible SSRF"),
    call(Some("ftplib"), "FTP", Severity::Medium, "unencrypted connection"),
    call(Some("smtplib"), "SMTP", Severity::Medium, "unencrypted connection"),
    call(Some("telnetlib"), "Telnet", Severity::Medium, "unencrypted connection"),
    call(Some("socket"), "create_connection", Severity::Medium, "outbound connection"),
    call(Some("ssl"), "wrap_socket", Severity::Medium, "manual TLS configuration"),
    call(Some("tempfile"), "mkstemp", Severity::Medium, "check temporary file permissions"),
    // informational
    call(Some("random"), "random", Severity::Low, "not cryptographically secure"),
    call(Some("random"), "randint", Severity::Low, "not cryptographically secure"),
    call(Some("random"), "choice", Severity::Low, "not cryptographically secure"),
    call(Some("base64"), "b64decode", Severity::Low, "encoded payload handling"),
    call(Some("base64"), "b64encode", Severity::Low, "encoded payload handling"),
    call(Some("binascii"), "a2b_base64", Severity::Low, "encoded payload handling"),
    call(Some("os"), "tempnam", Severity::Low, "deprecated temporary file API"),
];

struct CompiledPattern {
    pattern: &'static CallPattern,
    call: Regex,
    flag: Option<Regex>,
}

impl CallPattern {
    /// Display name, `module.function` or the bare function
    pub fn qualified_name(&self) -> String {
        match self.module {
            Some(module) => format!("{}.{}", module, self.function),
            None => self.function.to_string(),
        }
    }

    fn call_regex(&self) -> String {
        let receiver = self
            .module
            .and_then(|m| m.rsplit('.').next())
            .map(|segment| format!(r"\b{}\.", regex::escape(segment)))
            .unwrap_or_else(|| r"(?:^|[^\w.])".to_string());
        format!(r"{}{}\s*\(", receiver, regex::escape(self.function))
    }
}

static COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| {
    CALL_PATTERNS
        .iter()
        .map(|pattern| CompiledPattern {
            pattern,
            call: Regex::new(&pattern.call_regex()).expect("valid regex literal"),
            flag: pattern.required_flag.map(|flag| {
                Regex::new(&format!(r"\b{}\s*=\s*True\b", regex::escape(flag)))
                    .expect("valid regex literal")
            }),
        })
        .collect()
});

#[derive(Debug, Default)]
pub struct InsecureCallExtractor;

impl InsecureCallExtractor {
    pub fn analyze_str(&self, text: &str, result: &mut FileAnalysisResult) {
        let code = strip_comments_and_strings(text);
        let mut counts = [0usize; 3];
        let mut worst: Option<Severity> = None;

        for (index, line) in code.lines().enumerate() {
            for compiled in COMPILED.iter() {
                if compiled.flag.as_ref().is_some_and(|flag| !flag.is_match(line)) {
                    continue;
                }
                let severity = compiled.pattern.severity;
                for _ in compiled.call.find_iter(line) {
                    counts[severity as usize] += 1;
                    worst = worst.max(Some(severity));
                    result.anomalies.push(Anomaly::new(
                        "insecure_call",
                        severity.to_string(),
                        Location::Line { line: index + 1 },
                        format!(
                            "{}: {}",
                            compiled.pattern.qualified_name(),
                            compiled.pattern.description
                        ),
                    ));
                }
            }
        }

        let [low, medium, high] = counts;
        result
            .metrics
            .insert(INSECURE_CALL_COUNT.into(), (low + medium + high) as f64);
        result.metrics.insert(HIGH_SEVERITY_COUNT.into(), high as f64);
        result.metrics.insert(MEDIUM_SEVERITY_COUNT.into(), medium as f64);
        result.metrics.insert(LOW_SEVERITY_COUNT.into(), low as f64);
        result.confidence_score = worst.map_or(0.0, Severity::confidence);
    }
}

impl MetricExtractor for InsecureCallExtractor {
    fn name(&self) -> &'static str {
        "insecure-calls"
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
        let mut result = FileAnalysisResult::new("setup.py");
        InsecureCallExtractor.analyze_str(text, &mut result);
        result
    }

    #[test]
    fn test_bare_and_qualified_calls() {
        let result = analyze("eval(data)\nos.system('ls')\nx = random.randint(1, 6)\n");
        assert_eq!(result.metric(INSECURE_CALL_COUNT), Some(3.0));
        assert_eq!(result.metric(HIGH_SEVERITY_COUNT), Some(2.0));
        assert_eq!(result.metric(LOW_SEVERITY_COUNT), Some(1.0));
        assert_eq!(result.confidence_score, 0.9);
    }

    #[test]
    fn test_method_named_eval_is_not_bare_eval() {
        let result = analyze("model.eval()\nretrieval(x)\n");
        assert_eq!(result.metric(INSECURE_CALL_COUNT), Some(0.0));
    }

    #[test]
    fn test_shell_flag_required_for_subprocess() {
        let safe = analyze("subprocess.run(['ls', '-l'])\n");
        assert_eq!(safe.metric(INSECURE_CALL_COUNT), Some(0.0));

        let unsafe_call = analyze("subprocess.run(cmd, shell=True)\n");
        assert_eq!(unsafe_call.metric(HIGH_SEVERITY_COUNT), Some(1.0));
        assert_eq!(unsafe_call.anomalies[0].location, Location::Line { line: 1 });
    }

    #[test]
    fn test_dotted_module_matches_last_segment() {
        let result = analyze("tree = ElementTree.parse(path)\n");
        assert_eq!(result.metric(HIGH_SEVERITY_COUNT), Some(1.0));
        assert!(result.anomalies[0]
            .detail
            .starts_with("xml.etree.ElementTree.parse"));
    }

    #[test]
    fn test_calls_in_comments_and_strings_are_ignored() {
        let result = analyze("# eval(x)\nmsg = \"os.system(cmd)\"\n");
        assert_eq!(result.metric(INSECURE_CALL_COUNT), Some(0.0));
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn test_line_continuation_in_string_keeps_line_numbers() {
        let result = analyze("s = \"a\\\nb\"\neval(x)\n");
        assert_eq!(result.metric(HIGH_SEVERITY_COUNT), Some(1.0));
        assert_eq!(result.anomalies[0].location, Location::Line { line: 3 });
    }

    #[test]
    fn test_medium_confidence() {
        let result = analyze("requests.get(url)\n");
        assert_eq!(result.metric(MEDIUM_SEVERITY_COUNT), Some(1.0));
        assert_eq!(result.confidence_score, 0.6);
    }
}
