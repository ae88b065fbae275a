//! Crop command implementation
//!
//! Applies the auto-crop pass to existing sprites in place. Files are
//! independent, so they are processed in parallel.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use spritebake_raster::{crop_file, CropError, PngConfig};
use spritebake_spec::{BackendError, CropInfo};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CropOutcome {
    Cropped { info: CropInfo },
    /// Fully transparent; left untouched.
    Empty,
    Failed { code: String, error: String },
}

/// A file and what happened to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: CropOutcome,
}

/// Totals for a crop run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CropSummary {
    pub cropped: usize,
    pub empty: usize,
    pub failed: usize,
    pub files: Vec<CropEntry>,
}

/// PNG files at `target`: the file itself, or every `.png` below a directory.
pub fn collect_pngs(target: &Path) -> Vec<PathBuf> {
    if target.is_file() {
        return vec![target.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(target)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    files.sort();
    files
}

/// Crops every file in parallel, preserving input order in the result.
pub fn crop_all(files: &[PathBuf], png: &PngConfig) -> CropSummary {
    let files: Vec<CropEntry> = files
        .par_iter()
        .map(|path| {
            let outcome = match crop_file(path, png) {
                Ok(info) => {
                    debug!(path = %path.display(), size = ?info.final_size, "cropped");
                    CropOutcome::Cropped { info }
                }
                Err(CropError::EmptySprite { .. }) => {
                    warn!("No visible pixels in {}", path.display());
                    CropOutcome::Empty
                }
                Err(e) => CropOutcome::Failed {
                    code: e.code().to_string(),
                    error: e.to_string(),
                },
            };
            CropEntry {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    let mut summary = CropSummary::default();
    for entry in &files {
        match entry.outcome {
            CropOutcome::Cropped { .. } => summary.cropped += 1,
            CropOutcome::Empty => summary.empty += 1,
            CropOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary.files = files;
    summary
}

/// Run the crop command
///
/// # Returns
/// Exit code: 0 success, 1 if any file could not be cropped
pub fn run(target: &Path, json: bool) -> Result<ExitCode> {
    if !target.exists() {
        anyhow::bail!("Path does not exist: {}", target.display());
    }

    let files = collect_pngs(target);
    let summary = crop_all(&files, &PngConfig::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for entry in &summary.files {
            match &entry.outcome {
                CropOutcome::Cropped { info } => println!(
                    "  {} {} {}x{} -> {}x{}",
                    "CROPPED".green(),
                    entry.path.display(),
                    info.original_size[0],
                    info.original_size[1],
                    info.final_size[0],
                    info.final_size[1]
                ),
                CropOutcome::Empty => {
                    println!("  {} {} (no visible pixels)", "EMPTY".yellow(), entry.path.display())
                }
                CropOutcome::Failed { code, error } => println!(
                    "  {} {} [{}] {}",
                    "FAILED".red(),
                    entry.path.display(),
                    code,
                    error
                ),
            }
        }
        println!();
        println!("{} {}", "Cropped:".green().bold(), summary.cropped);
        println!("{} {}", "Empty:".yellow().bold(), summary.empty);
        println!("{} {}", "Failed:".red().bold(), summary.failed);
    }

    if summary.failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
