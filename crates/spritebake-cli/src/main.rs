//! Spritebake CLI - Batch renderer turning 3D models into 2D sprites
//!
//! This binary provides commands for rendering, planning, cropping and
//! inspecting sprite batches.

mod cli_args;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use spritebake_cli::commands::{self, EXIT_CONFIG};
use spritebake_cli::config::{BatchConfig, DEFAULT_FORMATS};
use spritebake_cli::logging;
use spritebake_spec::BackendError;

use cli_args::{Cli, Commands, RenderArgs};

fn load_config(settings: &RenderArgs) -> Result<BatchConfig, ExitCode> {
    BatchConfig::load(settings.config.as_deref(), settings.overrides()).map_err(|e| {
        eprintln!("{}: [{}] {}", "error".red(), e.code(), e);
        ExitCode::from(EXIT_CONFIG)
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render { settings, json } => match load_config(&settings) {
            Ok(config) => logging::init(config.verbose, config.log_file.as_deref())
                .and_then(|_| commands::render::run(&config, json)),
            Err(code) => return code,
        },
        Commands::Plan { settings } => match load_config(&settings) {
            Ok(config) => logging::init(config.verbose, config.log_file.as_deref())
                .and_then(|_| commands::plan::run(&config)),
            Err(code) => return code,
        },
        Commands::Crop {
            path,
            json,
            verbose,
        } => logging::init(verbose, None).and_then(|_| commands::crop::run(&path, json)),
        Commands::Inspect {
            path,
            formats,
            json,
        } => {
            let mut config = BatchConfig {
                formats: formats
                    .unwrap_or_else(|| DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect()),
                ..Default::default()
            };
            config.normalize_formats();
            logging::init(false, None)
                .and_then(|_| commands::inspect::run(&path, &config.formats, json))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}
