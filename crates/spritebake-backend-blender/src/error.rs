//! Error types for the Blender backend.

use std::path::PathBuf;

use spritebake_raster::RasterError;
use spritebake_spec::BackendError;
use thiserror::Error;

/// Result type for Blender subprocess operations.
pub type BlenderResult<T> = Result<T, BlenderError>;

/// Errors that can occur while driving the Blender process.
#[derive(Debug, Error)]
pub enum BlenderError {
    /// Blender executable not found.
    #[error("Blender executable not found. Ensure Blender is installed and in PATH, or set BLENDER_PATH environment variable")]
    BlenderNotFound,

    /// Failed to spawn Blender process.
    #[error("Failed to spawn Blender process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Blender process timed out.
    #[error("Blender process timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The capture was killed on operator request.
    #[error("Blender process aborted by interrupt")]
    Aborted,

    /// Blender process exited with non-zero status.
    #[error("Blender process exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Failed to write the capture request for Blender.
    #[error("Failed to write capture request: {0}")]
    WriteRequestFailed(#[source] std::io::Error),

    /// Failed to serialize the capture request.
    #[error("Failed to serialize capture request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to read report from Blender.
    #[error("Failed to read Blender report from {path}: {source}")]
    ReadReportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse report JSON from Blender.
    #[error("Failed to parse Blender report: {0}")]
    ParseReportFailed(#[source] serde_json::Error),

    /// Blender reported a failure in one of the capture stages.
    #[error("Blender capture failed during {stage}: {message}")]
    CaptureFailed { stage: String, message: String },

    /// Output image not found after rendering.
    #[error("Expected output file not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// Python entrypoint script not found.
    #[error("Python entrypoint script not found at: {path}")]
    EntrypointNotFound { path: PathBuf },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlenderError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new capture failed error.
    pub fn capture_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl BackendError for BlenderError {
    fn code(&self) -> &'static str {
        match self {
            BlenderError::BlenderNotFound => "BLENDER_001",
            BlenderError::SpawnFailed(_) => "BLENDER_002",
            BlenderError::Timeout { .. } => "BLENDER_003",
            BlenderError::ProcessFailed { .. } => "BLENDER_004",
            BlenderError::WriteRequestFailed(_) => "BLENDER_005",
            BlenderError::SerializeFailed(_) => "BLENDER_006",
            BlenderError::ReadReportFailed { .. } => "BLENDER_007",
            BlenderError::ParseReportFailed(_) => "BLENDER_008",
            BlenderError::CaptureFailed { .. } => "BLENDER_009",
            BlenderError::OutputNotFound { .. } => "BLENDER_010",
            BlenderError::EntrypointNotFound { .. } => "BLENDER_011",
            BlenderError::Io(_) => "BLENDER_012",
            BlenderError::Aborted => "BLENDER_013",
        }
    }

    fn category(&self) -> &'static str {
        "blender"
    }
}

/// A model that could not be brought into the scene.
///
/// Fails only the model it concerns; the batch continues.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Model file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Unsupported model format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Model {model} references missing file {companion}")]
    MissingCompanion { model: PathBuf, companion: PathBuf },

    #[error("Malformed model {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The engine itself refused the model while importing it.
    #[error("Engine failed to import {path}: {message}")]
    Rejected { path: PathBuf, message: String },
}

impl BackendError for ImportError {
    fn code(&self) -> &'static str {
        match self {
            ImportError::NotFound { .. } => "IMPORT_001",
            ImportError::UnsupportedFormat { .. } => "IMPORT_002",
            ImportError::MissingCompanion { .. } => "IMPORT_003",
            ImportError::Malformed { .. } => "IMPORT_004",
            ImportError::Rejected { .. } => "IMPORT_005",
        }
    }

    fn category(&self) -> &'static str {
        "import"
    }
}

/// A capture that did not produce an image.
///
/// Never retried automatically; no partial image is left behind.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Scene has no imported model")]
    NoModel,

    #[error("Scene has no camera configured")]
    NoCamera,

    /// The import stage failed inside the engine process.
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Engine(#[from] BlenderError),

    #[error("Rendered image could not be decoded: {0}")]
    Decode(#[from] RasterError),

    #[error("Rendered image is {actual:?}, expected {expected:?}")]
    SizeMismatch { expected: [u32; 2], actual: [u32; 2] },

    /// Failure raised by a non-Blender engine implementation.
    #[error("Render failed: {0}")]
    Other(String),
}

impl RenderError {
    /// True when the failure belongs to the model rather than the capture.
    pub fn is_import_failure(&self) -> bool {
        matches!(self, RenderError::Import(_))
    }
}

impl BackendError for RenderError {
    fn code(&self) -> &'static str {
        match self {
            RenderError::NoModel => "RENDER_001",
            RenderError::NoCamera => "RENDER_002",
            RenderError::Import(inner) => inner.code(),
            RenderError::Engine(inner) => inner.code(),
            RenderError::Decode(_) => "RENDER_003",
            RenderError::SizeMismatch { .. } => "RENDER_004",
            RenderError::Other(_) => "RENDER_005",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            RenderError::Import(_) => "import",
            _ => "render",
        }
    }
}
