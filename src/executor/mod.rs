//! Parallel Executor
//!
//! A fixed-size rayon pool built once per run and reused for every tag's
//! file batch. Each task reads one immutable path and returns one result;
//! the only state shared between tasks is the extractor itself.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::analyzer::traits::MetricExtractor;
use crate::analyzer::types::FileAnalysisResult;
use crate::scanner::types::CollectedFile;

/// Worker pool construction failure
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Failed to build worker pool with {workers} threads: {message}")]
    PoolBuild { workers: usize, message: String },
}

/// Reusable worker pool for per-file analysis
pub struct ParallelExecutor {
    pool: ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Result<Self, ExecutorError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("repodrift-worker-{}", i))
            .build()
            .map_err(|e| ExecutorError::PoolBuild {
                workers,
                message: e.to_string(),
            })?;
        log::debug!("Worker pool ready with {} threads", workers);
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyse every file and return the results sorted by relative path
    ///
    /// Result paths are rewritten to the root-relative form. A panicking
    /// extractor is contained to its file and recorded as that file's error.
    pub fn run(
        &self,
        extractor: &dyn MetricExtractor,
        files: &[CollectedFile],
    ) -> Vec<FileAnalysisResult> {
        let mut results: Vec<FileAnalysisResult> = self.pool.install(|| {
            files
                .par_iter()
                .map(|file| analyze_one(extractor, file))
                .collect()
        });
        results.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        results
    }
}

fn analyze_one(extractor: &dyn MetricExtractor, file: &CollectedFile) -> FileAnalysisResult {
    let started = Instant::now();
    let mut result = match catch_unwind(AssertUnwindSafe(|| extractor.analyze_file(&file.absolute))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let mut failed =
                FileAnalysisResult::failed(&file.relative, format!("Analyzer panicked: {}", message));
            failed.processing_time = started.elapsed();
            failed
        }
    };
    result.file_path = file.relative.clone();
    if let Some(error) = &result.error {
        log::warn!("Failed to analyze {}: {}", file.relative, error);
    }
    result
}
