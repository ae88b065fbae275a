//! Error types shared across the Spritebake crates.

use thiserror::Error;

/// Common interface for errors raised by the pipeline stages.
///
/// Each stage (planning, import, render, crop) has its own error enum; this
/// trait lets the batch layer report them uniformly without depending on the
/// concrete types.
///
/// ```ignore
/// use spritebake_spec::BackendError;
///
/// fn report<E: BackendError>(err: &E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "CONFIG_001" or "RENDER_002". Codes are
    /// stable and can be matched on by tooling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category ("config", "import", "render", "crop", "blender").
    fn category(&self) -> &'static str;
}

/// A render configuration that cannot be planned.
///
/// Raised before any capture starts; it aborts the whole batch.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid config: {field}: {reason}")]
pub struct InvalidConfig {
    /// Name of the offending configuration field.
    pub field: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl InvalidConfig {
    /// Creates a new invalid config error.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl BackendError for InvalidConfig {
    fn code(&self) -> &'static str {
        "CONFIG_001"
    }

    fn category(&self) -> &'static str {
        "config"
    }
}
