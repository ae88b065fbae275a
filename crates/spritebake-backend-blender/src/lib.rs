//! Spritebake Blender Backend
//!
//! Renders sprite captures by driving Blender as a headless subprocess.
//!
//! # Architecture
//!
//! The batch layer only sees the [`RenderEngine`] trait. [`BlenderEngine`]
//! implements it by recording scene state on a [`SceneHandle`] and, when a
//! capture is requested, spawning:
//!
//! ```text
//! blender --background --factory-startup --python entrypoint.py -- \
//!     --request <request.json> --report <report.json>
//! ```
//!
//! The Python entrypoint (`blender/entrypoint.py`, embedded in this crate)
//! imports the model, sets up an orthographic camera and a sun light,
//! renders a transparent RGBA PNG and writes a JSON report.
//!
//! # Blender Discovery
//!
//! 1. [`OrchestratorConfig::blender_path`]
//! 2. The `BLENDER_PATH` environment variable
//! 3. `blender` on `PATH`
//! 4. Common install locations

pub mod blender;
pub mod engine;
pub mod error;
pub mod import;
pub mod orchestrator;
pub mod report;

pub use blender::BlenderEngine;
pub use engine::{
    model_extension, CameraSetup, ImportedModel, LightSetup, RenderEngine, RenderedImage,
    SceneHandle, SUPPORTED_EXTENSIONS,
};
pub use error::{BlenderError, BlenderResult, ImportError, RenderError};
pub use import::{describe_model, validate_model, ModelSummary};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use report::{CaptureReport, CaptureRequest};
