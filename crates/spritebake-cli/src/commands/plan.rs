//! Plan command implementation
//!
//! Dry run: prints the capture plan and, when the input directory exists,
//! every job the render command would run, without starting Blender.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;
use spritebake_spec::{CapturePlan, Direction};

use super::reporting::print_error;
use super::EXIT_CONFIG;
use crate::batch::{discover_models, BatchRunner};
use crate::config::BatchConfig;

/// One planned capture as printed by `plan`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedJob {
    pub model: PathBuf,
    pub yaw: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub output: PathBuf,
    pub metadata: PathBuf,
    /// Would be skipped because the sprite and its sidecar already exist.
    pub skip: bool,
}

/// The full dry-run document.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutput {
    pub plan: CapturePlan,
    pub advisories: Vec<String>,
    pub jobs: Vec<PlannedJob>,
}

/// Builds the dry-run document for `config`. Input discovery is skipped
/// when no input directory is configured.
pub fn build(config: &BatchConfig) -> Result<PlanOutput> {
    let runner = BatchRunner::new(config)?;
    let models = if config.input_dir.as_os_str().is_empty() {
        Vec::new()
    } else {
        discover_models(&config.input_dir, &config.formats)?
    };

    let jobs = models
        .iter()
        .flat_map(|model| runner.jobs_for(model))
        .map(|job| PlannedJob {
            skip: config.skip_existing && job.is_complete(),
            model: job.model_path,
            yaw: job.capture.yaw,
            direction: job.capture.direction,
            output: job.output_path,
            metadata: job.metadata_path,
        })
        .collect();

    Ok(PlanOutput {
        plan: runner.plan().clone(),
        advisories: config.render.advisories(),
        jobs,
    })
}

/// Run the plan command
///
/// # Returns
/// Exit code: 0 success, 2 on a configuration error
pub fn run(config: &BatchConfig) -> Result<ExitCode> {
    if let Err(e) = config.render.validate() {
        print_error(&e);
        return Ok(ExitCode::from(EXIT_CONFIG));
    }
    let output = build(config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}
