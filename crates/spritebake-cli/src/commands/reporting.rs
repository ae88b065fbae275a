//! Console output shared by the commands.

use colored::Colorize;
use spritebake_spec::BackendError;

use crate::batch::{BatchSummary, JobStatus};
use crate::config::BatchConfig;

/// Prints a cyan framed title.
pub(crate) fn print_banner(title: &str) {
    println!("{}", "======================================".cyan());
    println!("{}", format!("  {}", title).cyan());
    println!("{}", "======================================".cyan());
    println!();
}

/// Prints `error: [CODE] message` to stderr.
pub(crate) fn print_error(err: &dyn BackendError) {
    eprintln!("{}: [{}] {}", "error".red(), err.code(), err.message());
}

/// Prints the effective render settings.
pub(crate) fn print_settings(config: &BatchConfig, canvas: u32) {
    let render = &config.render;
    println!("{} {}", "Input:".blue().bold(), config.input_dir.display());
    println!("{} {}", "Output:".blue().bold(), config.output_dir.display());
    println!(
        "{} {}° pitch, {}° yaw",
        "Camera:".blue().bold(),
        render.camera_angle,
        render.camera_yaw
    );
    println!(
        "{} {} units at {} px/unit ({}x{} canvas)",
        "Ortho scale:".blue().bold(),
        render.ortho_scale,
        render.pixels_per_unit,
        canvas,
        canvas
    );
    println!("{} {}x", "Scale factor:".blue().bold(), render.scale_factor);
    println!("{} {}", "Samples:".blue().bold(), render.samples);
    println!("{} {}", "Rotations:".blue().bold(), render.rotations);
    println!(
        "{} {}",
        "Auto-crop:".blue().bold(),
        if config.auto_crop { "enabled" } else { "disabled" }
    );
    if config.jobs > 1 {
        println!("{} {}", "Workers:".blue().bold(), config.jobs);
    }
    println!();
}

/// Prints the end-of-batch summary and the list of failed captures.
pub(crate) fn print_summary(summary: &BatchSummary) {
    println!();
    print_banner("Batch Render Summary");
    println!("{} {}", "Models found:".blue().bold(), summary.models_found);
    println!("{} {}", "Captures:".blue().bold(), summary.jobs.total);
    println!("{} {}", "Rendered:".green().bold(), summary.jobs.rendered);
    println!("{} {}", "Skipped:".yellow().bold(), summary.jobs.skipped);
    println!("{} {}", "Failed:".red().bold(), summary.jobs.failed);
    if summary.jobs.warnings > 0 {
        println!("{} {}", "Warnings:".yellow().bold(), summary.jobs.warnings);
    }
    println!(
        "{} {:.2}s",
        "Total runtime:".blue().bold(),
        summary.runtime_seconds
    );
    if summary.cancelled {
        println!("{}", "Batch was cancelled before all captures ran".yellow());
    }
    println!();

    let failures: Vec<_> = summary
        .models
        .iter()
        .flat_map(|model| model.jobs.iter().map(move |job| (model, job)))
        .filter_map(|(model, job)| match &job.status {
            JobStatus::Failed { code, error } => Some((model, job, code, error)),
            _ => None,
        })
        .collect();

    if !failures.is_empty() {
        println!("{}", "Failed captures:".red().bold());
        for (model, job, code, error) in failures {
            let angle = match job.direction {
                Some(direction) => direction.to_string(),
                None => format!("{}°", job.yaw),
            };
            println!(
                "  - {} ({}): [{}] {}",
                model.relative_path.display(),
                angle,
                code,
                error
            );
        }
        println!();
    }
}
