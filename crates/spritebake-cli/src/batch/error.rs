//! Batch-level error types.

use std::path::PathBuf;

use spritebake_backend_blender::{ImportError, RenderError};
use spritebake_raster::{CropError, RasterError};
use spritebake_spec::{BackendError, InvalidConfig};
use thiserror::Error;

/// Errors that stop a batch before or outside of individual jobs.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input directory does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),
}

impl BackendError for BatchError {
    fn code(&self) -> &'static str {
        match self {
            BatchError::InputNotFound { .. } => "BATCH_001",
            BatchError::Walk { .. } => "BATCH_002",
            BatchError::WorkerPool(_) => "BATCH_003",
            BatchError::InvalidConfig(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            BatchError::InvalidConfig(_) => "config",
            _ => "batch",
        }
    }
}

/// Why a single capture did not produce a sprite.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Render(RenderError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    #[error("Failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl JobError {
    /// True when the failure disqualifies every capture of the model.
    pub fn is_import_failure(&self) -> bool {
        match self {
            JobError::Import(_) => true,
            JobError::Render(err) => err.is_import_failure(),
            _ => false,
        }
    }
}

impl From<RenderError> for JobError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Import(inner) => JobError::Import(inner),
            other => JobError::Render(other),
        }
    }
}

impl BackendError for JobError {
    fn code(&self) -> &'static str {
        match self {
            JobError::Import(inner) => inner.code(),
            JobError::Render(inner) => inner.code(),
            JobError::Crop(inner) => inner.code(),
            JobError::Write { .. } => "BATCH_004",
            JobError::Metadata(_) => "BATCH_005",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            JobError::Import(_) => "import",
            JobError::Render(inner) => inner.category(),
            _ => "batch",
        }
    }
}
