//! Analysis Pipeline
//!
//! Drives one run: tags are processed strictly one after another against the
//! single working tree, files within a tag are fanned out to the worker pool.
//! A tag that cannot be checked out is skipped and recorded; the run goes on.

use std::time::Instant;

use serde::Serialize;

use crate::analyzer::traits::{aggregate, MetricExtractor};
use crate::analyzer::types::TagAnalysisResult;
use crate::detector::deviation::{Deviation, DeviationDetector};
use crate::detector::series::MetricMatrix;
use crate::executor::ParallelExecutor;
use crate::scanner::collector::FileCollector;
use crate::scanner::error::WalkerResult;
use crate::scanner::types::{SkippedTag, Tag};
use crate::scanner::walker::VersionWalker;

/// Everything a run produced, in chronological tag order
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryRun {
    /// Every tag found, including skipped ones
    pub tags: Vec<Tag>,
    /// One result per analysed tag
    pub results: Vec<TagAnalysisResult>,
    pub skipped: Vec<SkippedTag>,
}

impl HistoryRun {
    /// Sparse table of `metric` over the analysed tags
    pub fn matrix(&self, metric: &str) -> MetricMatrix {
        MetricMatrix::from_results(metric, &self.results)
    }

    /// Run `detector` over each metric in turn, attaching `context_metric`
    pub fn deviations<S: AsRef<str>>(
        &self,
        detector: &DeviationDetector,
        metrics: &[S],
        context_metric: Option<&str>,
    ) -> Vec<Deviation> {
        let context = context_metric.map(|metric| self.matrix(metric));
        metrics
            .iter()
            .flat_map(|metric| {
                let found = detector.detect_with_context(&self.matrix(metric.as_ref()), context.as_ref());
                log::info!(
                    "{}: {} deviation(s) above thresholds",
                    metric.as_ref(),
                    found.len()
                );
                found
            })
            .collect()
    }

    pub fn files_analyzed(&self) -> usize {
        self.results.iter().map(|r| r.files_analyzed).sum()
    }

    pub fn files_failed(&self) -> usize {
        self.results.iter().map(|r| r.files_failed).sum()
    }

    pub fn total_anomalies(&self) -> usize {
        self.results.iter().map(|r| r.total_anomalies).sum()
    }
}

/// Sequential tag loop over a [`VersionWalker`]
pub struct AnalysisPipeline<'a, W: VersionWalker> {
    walker: &'a mut W,
    collector: &'a FileCollector,
    executor: &'a ParallelExecutor,
    extractor: &'a dyn MetricExtractor,
}

impl<'a, W: VersionWalker> AnalysisPipeline<'a, W> {
    pub fn new(
        walker: &'a mut W,
        collector: &'a FileCollector,
        executor: &'a ParallelExecutor,
        extractor: &'a dyn MetricExtractor,
    ) -> Self {
        Self {
            walker,
            collector,
            executor,
            extractor,
        }
    }

    /// Analyse every tag, then restore the working tree
    ///
    /// Fails only when the tag list itself cannot be read.
    pub fn run(self) -> WalkerResult<HistoryRun> {
        let tags = self.walker.chronological_tags()?;
        if tags.is_empty() {
            log::warn!("No tags found in the repository; nothing to analyze");
            return Ok(HistoryRun::default());
        }

        log::info!(
            "Analyzing {} tags with the {} analyzer",
            tags.len(),
            self.extractor.name()
        );

        let mut run = HistoryRun {
            tags: tags.clone(),
            ..HistoryRun::default()
        };

        for (i, tag) in tags.iter().enumerate() {
            log::info!("Analyzing tag {} ({}/{})", tag.name, i + 1, tags.len());
            if let Err(e) = self.walker.checkout(tag) {
                log::warn!("Skipping tag {}: {}", tag.name, e);
                run.skipped.push(SkippedTag {
                    name: tag.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            run.results.push(self.analyze_tag(tag));
        }

        self.walker.restore_original_state();

        if run.files_analyzed() == 0 {
            log::warn!(
                "No files matched the filter in any of the {} tags",
                tags.len()
            );
        }
        log::info!(
            "Analyzed {} tags ({} skipped): {} file results, {} failed, {} anomalies",
            run.results.len(),
            run.skipped.len(),
            run.files_analyzed(),
            run.files_failed(),
            run.total_anomalies()
        );
        Ok(run)
    }

    fn analyze_tag(&self, tag: &Tag) -> TagAnalysisResult {
        let started = Instant::now();
        let files = self.collector.collect(self.walker.work_tree());
        log::debug!("Tag {}: {} eligible files", tag.name, files.len());

        let results = self.executor.run(self.extractor, &files);
        let result = aggregate(&tag.name, results, started.elapsed());
        log::debug!(
            "Tag {}: {} analyzed, {} failed, {} anomalies in {:.2?}",
            tag.name,
            result.files_analyzed,
            result.files_failed,
            result.total_anomalies,
            result.processing_time
        );
        result
    }
}
