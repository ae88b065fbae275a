//! Render command implementation
//!
//! Discovers models under the input directory and renders every planned
//! capture through Blender.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;
use spritebake_backend_blender::{BlenderEngine, OrchestratorConfig};
use spritebake_spec::BackendError;
use tracing::{info, warn};

use super::reporting::{print_banner, print_error, print_settings, print_summary};
use super::EXIT_CONFIG;
use crate::batch::{discover_models, BatchRunner, BatchSummary};
use crate::cancel::{install_ctrl_c_handler, CancelFlag, EXIT_INTERRUPTED};
use crate::config::BatchConfig;

/// Run the render command
///
/// # Returns
/// Exit code: 0 when no capture failed, 1 when any failed, 2 on a
/// configuration error, 130 when an interrupt aborted a capture
pub fn run(config: &BatchConfig, json: bool) -> Result<ExitCode> {
    let start = Instant::now();

    if let Err(e) = config.validate() {
        print_error(&e);
        return Ok(ExitCode::from(EXIT_CONFIG));
    }
    let runner = match BatchRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            print_error(&e);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };
    for advisory in config.render.advisories() {
        warn!("{}", advisory);
    }

    let models = match discover_models(&config.input_dir, &config.formats) {
        Ok(models) => models,
        Err(e) => {
            print_error(&e);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    if !json {
        print_banner("Spritebake Batch Renderer");
        print_settings(config, runner.plan().canvas_width_px);
        println!(
            "{} Found {} models to process",
            "INFO".blue().bold(),
            models.len()
        );
        println!();
    }

    let cancel = CancelFlag::new();
    let report = if models.is_empty() {
        info!("No models found in {}", config.input_dir.display());
        Default::default()
    } else {
        let engine_config = OrchestratorConfig {
            blender_path: config.blender_path.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            ..Default::default()
        }
        .abort_on(cancel.abort_handle());
        let probe = BlenderEngine::with_config(engine_config.clone());
        if let Err(e) = probe.check_available() {
            anyhow::bail!("[{}] {}", e.code(), e);
        }

        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                config.output_dir.display()
            )
        })?;

        install_ctrl_c_handler(cancel.clone())?;
        let runner = runner.with_cancel(cancel.clone());

        if config.jobs > 1 {
            runner.run_parallel(
                || BlenderEngine::with_config(engine_config.clone()),
                &models,
                config.jobs,
            )?
        } else {
            let mut engine = probe;
            runner.run(&mut engine, &models)
        }
    };

    let summary = BatchSummary::new(
        config.input_dir.clone(),
        config.output_dir.clone(),
        report,
        start.elapsed().as_secs_f64(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if cancel.is_aborted() {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else if summary.has_failures() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
