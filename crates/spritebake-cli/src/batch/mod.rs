//! Batch orchestration: discovery, capture execution and result reporting.

mod discover;
mod error;
mod result;
mod runner;

use std::path::PathBuf;

use serde::Serialize;

pub use discover::{discover_models, ModelEntry};
pub use error::{BatchError, JobError};
pub use result::{BatchReport, JobCounts, JobResult, JobStatus, ModelOutcome, ModelResult};
pub use runner::{BatchRunner, CANCELLED, OUTPUT_EXISTS};

/// Machine-readable record of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub models_found: usize,
    pub models_failed: usize,
    pub jobs: JobCounts,
    pub cancelled: bool,
    pub runtime_seconds: f64,
    pub models: Vec<ModelResult>,
}

impl BatchSummary {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, report: BatchReport, runtime_seconds: f64) -> Self {
        let models_failed = report
            .models
            .iter()
            .filter(|m| matches!(m.outcome, ModelOutcome::Failed(_)))
            .count();
        Self {
            input_dir,
            output_dir,
            models_found: report.models.len(),
            models_failed,
            jobs: report.counts(),
            cancelled: report.cancelled,
            runtime_seconds,
            models: report.models,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.models_failed > 0
    }
}
