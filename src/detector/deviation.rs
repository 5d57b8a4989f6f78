//! Dual-threshold deviation detection
//!
//! A value at tag `i` is flagged only when it jumps away from the value at
//! tag `i - 1` *and* from the mean of every earlier defined value. An
//! undefined predecessor or an empty history makes the corresponding
//! magnitude infinite, which never passes: the comparison is skipped rather
//! than reported.

use serde::Serialize;

use crate::detector::series::{MetricMatrix, MetricSeries};

/// Minimum magnitudes a change must exceed (strictly) to be flagged
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub previous: f64,
    pub mean: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            previous: 0.5,
            mean: 0.5,
        }
    }
}

/// Magnitudes of one comparison; infinite when not comparable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub current: f64,
    pub previous: Option<f64>,
    pub mean_prior: Option<f64>,
    pub deviation_from_previous: f64,
    pub deviation_from_mean: f64,
}

impl Comparison {
    /// Compare the value at `index` against its history, `None` when the
    /// file has no value there
    pub fn at(series: &MetricSeries, index: usize) -> Option<Self> {
        let current = series.get(index)?;
        let previous = index.checked_sub(1).and_then(|p| series.get(p));

        let (sum, count) = series
            .prior(index)
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        let mean_prior = (count > 0).then(|| sum / count as f64);

        Some(Self {
            current,
            previous,
            mean_prior,
            deviation_from_previous: previous.map_or(f64::INFINITY, |p| (current - p).abs()),
            deviation_from_mean: mean_prior.map_or(f64::INFINITY, |m| (current - m).abs()),
        })
    }

    pub fn exceeds(&self, thresholds: &Thresholds) -> bool {
        self.deviation_from_previous.is_finite()
            && self.deviation_from_mean.is_finite()
            && self.deviation_from_previous > thresholds.previous
            && self.deviation_from_mean > thresholds.mean
    }
}

/// Change of the secondary metric across a flagged tag pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextDelta {
    pub metric: String,
    pub previous: Option<f64>,
    pub current: Option<f64>,
}

impl ContextDelta {
    pub fn difference(&self) -> Option<f64> {
        Some(self.current? - self.previous?)
    }
}

/// A flagged jump
///
/// Only built for comparisons that passed both thresholds, so the previous
/// value and the prior mean are always defined and both magnitudes finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    pub file_path: String,
    pub metric: String,
    pub previous_tag: String,
    pub current_tag: String,
    pub current_value: f64,
    pub previous_value: f64,
    pub mean_prior: f64,
    pub deviation_from_previous: f64,
    pub deviation_from_mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextDelta>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationDetector {
    thresholds: Thresholds,
}

impl DeviationDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Flagged jumps, ordered by file path then tag
    pub fn detect(&self, matrix: &MetricMatrix) -> Vec<Deviation> {
        self.detect_with_context(matrix, None)
    }

    /// As [`detect`](Self::detect), attaching the change of `context` at each
    /// flagged tag pair. The context never influences flagging.
    pub fn detect_with_context(
        &self,
        matrix: &MetricMatrix,
        context: Option<&MetricMatrix>,
    ) -> Vec<Deviation> {
        let mut deviations = Vec::new();
        for (file_path, series) in &matrix.rows {
            for index in 1..matrix.tags.len() {
                let Some(comparison) = Comparison::at(series, index) else {
                    continue;
                };
                if !comparison.exceeds(&self.thresholds) {
                    continue;
                }
                let (Some(previous_value), Some(mean_prior)) =
                    (comparison.previous, comparison.mean_prior)
                else {
                    continue;
                };
                deviations.push(Deviation {
                    file_path: file_path.clone(),
                    metric: matrix.metric.clone(),
                    previous_tag: matrix.tags[index - 1].clone(),
                    current_tag: matrix.tags[index].clone(),
                    current_value: comparison.current,
                    previous_value,
                    mean_prior,
                    deviation_from_previous: comparison.deviation_from_previous,
                    deviation_from_mean: comparison.deviation_from_mean,
                    context: context.map(|ctx| ContextDelta {
                        metric: ctx.metric.clone(),
                        previous: ctx.get(file_path, index - 1),
                        current: ctx.get(file_path, index),
                    }),
                });
            }
        }
        log::debug!(
            "{} deviation(s) on {} across {} file(s)",
            deviations.len(),
            matrix.metric,
            matrix.rows.len()
        );
        deviations
    }
}
