//! Capture jobs: one (model, yaw) pair with its output locations.

use std::path::{Path, PathBuf};

use crate::plan::{Capture, CapturePlan};

/// A single planned render awaiting execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureJob {
    /// Model file to import.
    pub model_path: PathBuf,
    /// Angle and direction to capture.
    pub capture: Capture,
    /// Final sprite location.
    pub output_path: PathBuf,
    /// JSON sidecar location (same stem as the sprite).
    pub metadata_path: PathBuf,
}

impl CaptureJob {
    /// Builds the job for `capture`, mirroring `relative` (the model path
    /// relative to the input root) under `output_dir`.
    pub fn new(model_path: &Path, relative: &Path, output_dir: &Path, capture: Capture) -> Self {
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sprite".to_string());
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        let base = format!("{}{}", stem, capture.file_suffix());
        let dir = output_dir.join(parent);

        Self {
            model_path: model_path.to_path_buf(),
            capture,
            output_path: dir.join(format!("{}.png", base)),
            metadata_path: dir.join(format!("{}.json", base)),
        }
    }

    /// True when both the sprite and its sidecar are on disk.
    ///
    /// The sidecar is written first, so a sprite alone never counts.
    pub fn is_complete(&self) -> bool {
        self.output_path.is_file() && self.metadata_path.is_file()
    }

    /// Short label for logs, e.g. `crate.glb@90` or `crate.glb (east)`.
    pub fn label(&self) -> String {
        let name = self
            .model_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.capture.direction {
            Some(direction) => format!("{} ({})", name, direction),
            None => format!("{}@{}", name, self.capture.yaw),
        }
    }
}

/// Expands a plan into the contiguous job group for one model.
pub fn jobs_for_model(
    model_path: &Path,
    relative: &Path,
    output_dir: &Path,
    plan: &CapturePlan,
) -> Vec<CaptureJob> {
    plan.captures
        .iter()
        .map(|&capture| CaptureJob::new(model_path, relative, output_dir, capture))
        .collect()
}
