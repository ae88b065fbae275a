//! Per-job and per-model results.

use std::path::PathBuf;

use serde::Serialize;
use spritebake_spec::{CropInfo, Direction};

/// What happened to one capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Rendered {
        image_path: PathBuf,
        metadata_path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        crop: Option<CropInfo>,
        /// Non-fatal problems, e.g. an empty sprite left uncropped.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        code: String,
        error: String,
    },
}

/// One capture's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub yaw: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub output_path: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
    pub duration_ms: u64,
}

impl JobResult {
    pub fn is_rendered(&self) -> bool {
        matches!(self.status, JobStatus::Rendered { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, JobStatus::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, JobStatus::Failed { .. })
    }

    pub fn has_warnings(&self) -> bool {
        matches!(&self.status, JobStatus::Rendered { warnings, .. } if !warnings.is_empty())
    }
}

/// Summary outcome for a model across all its captures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ModelOutcome {
    /// Sprites written by this run.
    Rendered(Vec<PathBuf>),
    Skipped(String),
    /// First failure message; other captures may still have rendered.
    Failed(String),
}

/// A model and the results of its captures, in plan order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResult {
    pub model_path: PathBuf,
    pub relative_path: PathBuf,
    #[serde(flatten)]
    pub outcome: ModelOutcome,
    pub jobs: Vec<JobResult>,
}

impl ModelResult {
    /// Derives the model outcome from its job results: any failure fails the
    /// model, otherwise any render makes it rendered, otherwise skipped.
    pub fn from_jobs(model_path: PathBuf, relative_path: PathBuf, jobs: Vec<JobResult>) -> Self {
        let first_failure = jobs.iter().find_map(|job| match &job.status {
            JobStatus::Failed { code, error } => Some(format!("[{}] {}", code, error)),
            _ => None,
        });
        let rendered: Vec<PathBuf> = jobs
            .iter()
            .filter_map(|job| match &job.status {
                JobStatus::Rendered { image_path, .. } => Some(image_path.clone()),
                _ => None,
            })
            .collect();

        let outcome = if let Some(error) = first_failure {
            ModelOutcome::Failed(error)
        } else if !rendered.is_empty() {
            ModelOutcome::Rendered(rendered)
        } else {
            let reason = jobs
                .iter()
                .find_map(|job| match &job.status {
                    JobStatus::Skipped { reason } => Some(reason.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| "no captures planned".to_string());
            ModelOutcome::Skipped(reason)
        };

        Self {
            model_path,
            relative_path,
            outcome,
            jobs,
        }
    }
}

/// Job totals across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Rendered jobs carrying warnings.
    pub warnings: usize,
}

/// Results of a batch run, one entry per model in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub models: Vec<ModelResult>,
    pub cancelled: bool,
}

impl BatchReport {
    /// Totals over every job.
    pub fn counts(&self) -> JobCounts {
        let mut counts = JobCounts::default();
        for job in self.models.iter().flat_map(|m| &m.jobs) {
            counts.total += 1;
            match job.status {
                JobStatus::Rendered { .. } => counts.rendered += 1,
                JobStatus::Skipped { .. } => counts.skipped += 1,
                JobStatus::Failed { .. } => counts.failed += 1,
            }
            if job.has_warnings() {
                counts.warnings += 1;
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.models
            .iter()
            .any(|m| matches!(m.outcome, ModelOutcome::Failed(_)))
    }

    /// Model outcomes only.
    pub fn outcomes(&self) -> Vec<&ModelOutcome> {
        self.models.iter().map(|m| &m.outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job(status: JobStatus) -> JobResult {
        JobResult {
            yaw: 0.0,
            direction: None,
            output_path: PathBuf::from("out/a.png"),
            status,
            duration_ms: 1,
        }
    }

    fn rendered(path: &str) -> JobStatus {
        JobStatus::Rendered {
            image_path: PathBuf::from(path),
            metadata_path: PathBuf::from(path).with_extension("json"),
            crop: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_outcome_precedence() {
        let failed = ModelResult::from_jobs(
            "a.glb".into(),
            "a.glb".into(),
            vec![
                job(rendered("a_s.png")),
                job(JobStatus::Failed {
                    code: "RENDER_005".into(),
                    error: "boom".into(),
                }),
            ],
        );
        assert_eq!(failed.outcome, ModelOutcome::Failed("[RENDER_005] boom".into()));

        let mixed = ModelResult::from_jobs(
            "a.glb".into(),
            "a.glb".into(),
            vec![
                job(JobStatus::Skipped {
                    reason: "exists".into(),
                }),
                job(rendered("a_e.png")),
            ],
        );
        assert_eq!(
            mixed.outcome,
            ModelOutcome::Rendered(vec![PathBuf::from("a_e.png")])
        );

        let skipped = ModelResult::from_jobs(
            "a.glb".into(),
            "a.glb".into(),
            vec![job(JobStatus::Skipped {
                reason: "exists".into(),
            })],
        );
        assert_eq!(skipped.outcome, ModelOutcome::Skipped("exists".into()));
    }

    #[test]
    fn test_job_json_shape() {
        let value = serde_json::to_value(job(JobStatus::Failed {
            code: "IMPORT_003".into(),
            error: "missing buffer".into(),
        }))
        .unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["code"], "IMPORT_003");
        assert!(value.get("direction").is_none());

        let model = ModelResult::from_jobs("a.glb".into(), "a.glb".into(), vec![]);
        let value = serde_json::to_value(model).unwrap();
        assert_eq!(value["outcome"], "skipped");
        assert_eq!(value["detail"], "no captures planned");
    }
}
