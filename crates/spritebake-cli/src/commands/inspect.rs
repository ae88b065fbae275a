//! Inspect command implementation
//!
//! Reports model dimensions in world units without launching Blender and
//! suggests import scale factors for a target tile size.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spritebake_backend_blender::{describe_model, ModelSummary};
use spritebake_spec::BackendError;

use crate::batch::discover_models;

/// Scale factor suggestions derived from the average model size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleAdvice {
    pub average_max_dimension: f64,
    /// Makes the average model span one world unit.
    pub one_unit_per_tile: f64,
    /// Makes the average model span two world units.
    pub two_units_per_tile: f64,
}

/// Inspection results.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub models: Vec<ModelSummary>,
    pub errors: Vec<InspectError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_advice: Option<ScaleAdvice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectError {
    pub path: PathBuf,
    pub code: String,
    pub error: String,
}

/// Largest side of the model's bounding box, if known.
pub fn max_dimension(summary: &ModelSummary) -> Option<f64> {
    summary
        .bounds
        .map(|b| b.size().into_iter().fold(0.0_f64, f64::max))
}

/// Scale advice from the models with known, non-zero size.
pub fn scale_advice(models: &[ModelSummary]) -> Option<ScaleAdvice> {
    let sizes: Vec<f64> = models
        .iter()
        .filter_map(max_dimension)
        .filter(|d| *d > 0.0)
        .collect();
    if sizes.is_empty() {
        return None;
    }
    let average = sizes.iter().sum::<f64>() / sizes.len() as f64;
    Some(ScaleAdvice {
        average_max_dimension: average,
        one_unit_per_tile: 1.0 / average,
        two_units_per_tile: 2.0 / average,
    })
}

/// Inspects a single model or every model under a directory.
pub fn inspect(target: &Path, formats: &[String]) -> Result<InspectReport> {
    let paths: Vec<PathBuf> = if target.is_dir() {
        discover_models(target, formats)?
            .into_iter()
            .map(|m| m.path)
            .collect()
    } else {
        vec![target.to_path_buf()]
    };

    let mut models = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match describe_model(&path) {
            Ok(summary) => models.push(summary),
            Err(e) => errors.push(InspectError {
                code: e.code().to_string(),
                error: e.to_string(),
                path,
            }),
        }
    }

    let scale_advice = scale_advice(&models);
    Ok(InspectReport {
        models,
        errors,
        scale_advice,
    })
}

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 success, 1 if any model could not be read
pub fn run(target: &Path, formats: &[String], json: bool) -> Result<ExitCode> {
    let report = inspect(target, formats)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn print_report(report: &InspectReport) {
    for model in &report.models {
        let name = model
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{} {}", "Model:".blue().bold(), name);
        if let Some(count) = model.mesh_count {
            println!("  Meshes: {}", count);
        }
        if let Some(count) = model.vertex_count {
            println!("  Vertices: {}", count);
        }
        match model.bounds {
            Some(bounds) => {
                let [w, d, h] = bounds.size();
                println!("  Bounding box: {:.3} x {:.3} x {:.3} units", w, d, h);
            }
            None => println!("  {}", "Bounding box: unavailable for this format".dimmed()),
        }
        for companion in &model.companions {
            let marker = if companion.is_file() {
                "ok".green()
            } else {
                "missing".red()
            };
            println!("  References: {} ({})", companion.display(), marker);
        }
    }

    for error in &report.errors {
        println!(
            "{} {}: [{}] {}",
            "FAILED".red(),
            error.path.display(),
            error.code,
            error.error
        );
    }

    if let Some(advice) = &report.scale_advice {
        println!();
        println!(
            "{} {:.3} units",
            "Average max dimension:".blue().bold(),
            advice.average_max_dimension
        );
        println!("{}", "Scale factor recommendations:".blue().bold());
        println!("  1 unit per tile:  scale_factor = {:.3}", advice.one_unit_per_tile);
        println!("  2 units per tile: scale_factor = {:.3}", advice.two_units_per_tile);
        println!("  No scaling:       scale_factor = 1.0");
    }
}
