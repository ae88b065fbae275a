//! Write-then-rename file replacement.
//!
//! Readers of `path` see either the previous contents or the complete new
//! contents, never a partially written file.

use std::io::Write;
use std::path::Path;

use crate::error::RasterError;

/// Atomically replace `path` with `bytes`, creating parent directories as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RasterError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // Same directory as the target so the final rename never crosses filesystems.
    let mut file = tempfile::Builder::new()
        .prefix(".spritebake-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    file.persist(path).map_err(|e| RasterError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
