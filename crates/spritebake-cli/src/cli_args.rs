//! CLI argument definitions for the Spritebake command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spritebake_cli::config::ConfigOverrides;

/// Spritebake - Batch 3D model to 2D sprite renderer
#[derive(Parser)]
#[command(name = "spritebake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Render every model under the input directory to sprites
    Render {
        #[command(flatten)]
        settings: RenderArgs,

        /// Print the batch summary as JSON instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// Print the capture plan and job list as JSON without rendering
    Plan {
        #[command(flatten)]
        settings: RenderArgs,
    },

    /// Auto-crop existing sprites in place (a PNG file or a directory)
    Crop {
        /// PNG file or directory to process recursively
        path: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report model dimensions and suggest scale factors
    Inspect {
        /// Model file or directory to scan
        path: PathBuf,

        /// Model extensions to include when scanning a directory
        #[arg(long, value_delimiter = ',')]
        formats: Option<Vec<String>>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Render settings shared by `render` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RenderArgs {
    /// Input directory containing 3D models
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for rendered sprites [default: ./rendered_sprites]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Load settings from a JSON config file (flags take precedence)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Camera pitch in degrees (90 = top-down, 55 = classic angled view)
    #[arg(short, long = "angle", allow_negative_numbers = true)]
    pub angle: Option<f64>,

    /// Camera yaw offset in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub camera_yaw: Option<f64>,

    /// Orthographic frustum size in world units
    #[arg(long)]
    pub ortho_scale: Option<f64>,

    /// Output pixels per world unit
    #[arg(long)]
    pub pixels_per_unit: Option<f64>,

    /// Anti-aliasing samples (higher = smoother, slower)
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Captures per model: 1 (single) or 4 (S/E/N/W)
    #[arg(long)]
    pub rotations: Option<u32>,

    /// Uniform scale applied to imported models
    #[arg(long)]
    pub scale_factor: Option<f64>,

    /// Sun light intensity
    #[arg(long)]
    pub light_strength: Option<f64>,

    /// Sun light tilt in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub light_angle_x: Option<f64>,

    /// Sun light heading in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub light_angle_z: Option<f64>,

    /// Model extensions to discover, comma separated (e.g. .glb,.obj)
    #[arg(long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Skip captures whose sprite already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Disable automatic cropping of transparent pixels
    #[arg(long)]
    pub no_auto_crop: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write a DEBUG log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Models to render concurrently, each in its own Blender process
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-capture Blender timeout in seconds (unlimited by default)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Blender executable (defaults to BLENDER_PATH, then PATH)
    #[arg(long)]
    pub blender: Option<PathBuf>,
}

impl RenderArgs {
    /// Flag layer for [`spritebake_cli::config::BatchConfig::load`].
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            camera_angle: self.angle,
            camera_yaw: self.camera_yaw,
            ortho_scale: self.ortho_scale,
            pixels_per_unit: self.pixels_per_unit,
            samples: self.samples,
            rotations: self.rotations,
            scale_factor: self.scale_factor,
            light_strength: self.light_strength,
            light_angle_x: self.light_angle_x,
            light_angle_z: self.light_angle_z,
            formats: self.formats.clone(),
            skip_existing: self.skip_existing,
            no_auto_crop: self.no_auto_crop,
            verbose: self.verbose,
            log_file: self.log_file.clone(),
            jobs: self.jobs,
            timeout_secs: self.timeout,
            blender_path: self.blender.clone(),
        }
    }
}
