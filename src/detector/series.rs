//! Sparse Metric Series
//!
//! One metric's values per file, indexed by tag position. A file that did not
//! exist at a tag (or failed there) has no entry at that index; absence is
//! never stored as zero.

use std::collections::BTreeMap;

use crate::analyzer::types::TagAnalysisResult;

/// Values of one metric for one file, keyed by tag index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    values: BTreeMap<usize, f64>,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag_index: usize, value: f64) {
        self.values.insert(tag_index, value);
    }

    pub fn get(&self, tag_index: usize) -> Option<f64> {
        self.values.get(&tag_index).copied()
    }

    /// Number of tags the file has a value for
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Defined `(tag index, value)` pairs in tag order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().map(|(&i, &v)| (i, v))
    }

    /// Defined values at indices strictly below `tag_index`
    pub fn prior(&self, tag_index: usize) -> impl Iterator<Item = f64> + '_ {
        self.values.range(..tag_index).map(|(_, &v)| v)
    }
}

impl FromIterator<(usize, f64)> for MetricSeries {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Sparse tag x file table of one metric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMatrix {
    pub metric: String,
    /// Tag names in chronological order; series indices point into this
    pub tags: Vec<String>,
    /// Series keyed by relative file path, lexicographically ordered
    pub rows: BTreeMap<String, MetricSeries>,
}

impl MetricMatrix {
    pub fn new(metric: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            metric: metric.into(),
            tags,
            rows: BTreeMap::new(),
        }
    }

    /// Build from chronologically ordered tag results
    ///
    /// Only valid file results that carry `metric` contribute a cell.
    pub fn from_results(metric: &str, results: &[TagAnalysisResult]) -> Self {
        let tags = results.iter().map(|r| r.tag_name.clone()).collect();
        let mut matrix = Self::new(metric, tags);
        for (index, tag) in results.iter().enumerate() {
            for file in tag.valid_results() {
                if let Some(value) = file.metric(metric) {
                    matrix.insert(&file.file_path, index, value);
                }
            }
        }
        matrix
    }

    pub fn insert(&mut self, file_path: &str, tag_index: usize, value: f64) {
        self.rows
            .entry(file_path.to_string())
            .or_default()
            .insert(tag_index, value);
    }

    pub fn get(&self, file_path: &str, tag_index: usize) -> Option<f64> {
        self.rows.get(file_path).and_then(|s| s.get(tag_index))
    }

    pub fn series(&self, file_path: &str) -> Option<&MetricSeries> {
        self.rows.get(file_path)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::traits::aggregate;
    use crate::analyzer::types::FileAnalysisResult;
    use std::time::Duration;

    fn tag(name: &str, files: &[(&str, f64)]) -> TagAnalysisResult {
        let results = files
            .iter()
            .map(|(path, v)| FileAnalysisResult::new(*path).with_metric("m", *v))
            .collect();
        aggregate(name, results, Duration::ZERO)
    }

    #[test]
    fn test_from_results_is_sparse() {
        let results = vec![
            tag("v1", &[("a.py", 1.0), ("b.py", 2.0)]),
            tag("v2", &[("a.py", 1.5)]),
            tag("v3", &[("a.py", 1.0), ("b.py", 0.0)]),
        ];
        let matrix = MetricMatrix::from_results("m", &results);

        assert_eq!(matrix.tags, vec!["v1", "v2", "v3"]);
        assert_eq!(matrix.series("a.py").unwrap().len(), 3);
        assert_eq!(matrix.get("b.py", 1), None);
        assert_eq!(matrix.get("b.py", 2), Some(0.0));
        assert_eq!(matrix.series("b.py").unwrap().len(), 2);
    }

    #[test]
    fn test_failed_files_leave_no_cell() {
        let mut failed = FileAnalysisResult::new("a.py").with_metric("m", 9.0);
        failed.error = Some("unreadable".into());
        let results = vec![aggregate("v1", vec![failed], Duration::ZERO)];
        let matrix = MetricMatrix::from_results("m", &results);
        assert!(matrix.is_empty());
        assert_eq!(matrix.tags.len(), 1);
    }

    #[test]
    fn test_prior_values() {
        let series: MetricSeries = [(0, 1.0), (2, 3.0), (3, 5.0)].into_iter().collect();
        assert_eq!(series.prior(3).collect::<Vec<_>>(), vec![1.0, 3.0]);
        assert_eq!(series.prior(0).count(), 0);
    }
}
