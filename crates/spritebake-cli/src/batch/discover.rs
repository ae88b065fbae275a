//! Model discovery.

use std::path::{Path, PathBuf};

use spritebake_backend_blender::model_extension;
use walkdir::WalkDir;

use super::error::BatchError;

/// A discovered model and its location relative to the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub path: PathBuf,
    /// Mirrored under the output directory.
    pub relative: PathBuf,
}

impl ModelEntry {
    /// Entry for `path` found under `root`.
    pub fn new(root: &Path, path: &Path) -> Self {
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }
}

/// Recursively finds files under `input_dir` whose extension is in
/// `formats` (lowercase, dotted). Extension matching is case-insensitive.
///
/// A directory with no matching files yields an empty list. Results are
/// sorted so repeated runs visit models in the same order.
pub fn discover_models(input_dir: &Path, formats: &[String]) -> Result<Vec<ModelEntry>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let mut models = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| BatchError::Walk {
            path: input_dir.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = model_extension(entry.path())
            .is_some_and(|ext| formats.iter().any(|f| *f == ext));
        if matches {
            models.push(ModelEntry::new(input_dir, entry.path()));
        }
    }

    models.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(models)
}
