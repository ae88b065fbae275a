//! [`RenderEngine`] backed by headless Blender.
//!
//! Scene operations only record state on the handle; the actual import,
//! camera setup and render all happen inside one Blender process started by
//! [`RenderEngine::render_to_image`]. Every capture therefore begins from a
//! factory-fresh scene, which makes resets free and leaks between captures
//! impossible.

use std::path::Path;

use spritebake_raster::read_png;
use spritebake_spec::RenderConfig;
use tracing::{debug, info};

use crate::engine::{
    CameraSetup, ImportedModel, LightSetup, RenderEngine, RenderedImage, SceneHandle,
};
use crate::error::{BlenderError, ImportError, RenderError};
use crate::import::validate_model;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::report::{stage, CaptureRequest};

/// Blender-backed render engine. One instance per worker.
#[derive(Debug, Default)]
pub struct BlenderEngine {
    orchestrator: Orchestrator,
    generation: u64,
    announced_version: bool,
}

impl BlenderEngine {
    /// Creates an engine with default orchestrator settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given orchestrator settings.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self {
            orchestrator: Orchestrator::with_config(config),
            ..Default::default()
        }
    }

    /// Fails early when no Blender executable can be found.
    pub fn check_available(&self) -> Result<(), BlenderError> {
        self.orchestrator.find_blender().map(|_| ())
    }

    fn build_request(
        scene: &SceneHandle,
        width: u32,
        height: u32,
        samples: u32,
        output_path: &Path,
    ) -> Result<CaptureRequest, RenderError> {
        let model = scene.model.as_ref().ok_or(RenderError::NoModel)?;
        let camera = scene.camera.ok_or(RenderError::NoCamera)?;
        let light = scene
            .light
            .unwrap_or_else(|| LightSetup::from_config(&RenderConfig::default()));

        Ok(CaptureRequest {
            model_path: model.path.clone(),
            scale_factor: model.scale_factor,
            camera: camera.into(),
            light,
            width,
            height,
            samples,
            output_path: output_path.to_path_buf(),
        })
    }
}

impl RenderEngine for BlenderEngine {
    fn reset_scene(&mut self) -> SceneHandle {
        self.generation += 1;
        SceneHandle::new(self.generation)
    }

    fn import_model(
        &mut self,
        scene: &mut SceneHandle,
        path: &Path,
        scale_factor: f64,
    ) -> Result<(), ImportError> {
        validate_model(path)?;
        scene.model = Some(ImportedModel {
            path: path.to_path_buf(),
            scale_factor,
        });
        Ok(())
    }

    fn configure_camera(&mut self, scene: &mut SceneHandle, camera: CameraSetup) {
        scene.camera = Some(camera);
    }

    fn configure_light(&mut self, scene: &mut SceneHandle, light: LightSetup) {
        scene.light = Some(light);
    }

    fn render_to_image(
        &mut self,
        scene: &SceneHandle,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<RenderedImage, RenderError> {
        let work_dir = tempfile::Builder::new()
            .prefix("spritebake_capture_")
            .tempdir()
            .map_err(BlenderError::Io)?;
        let output_path = work_dir.path().join("render.png");
        let request = Self::build_request(scene, width, height, samples, &output_path)?;

        let report = self.orchestrator.run_capture(&request, work_dir.path())?;

        if !report.ok {
            let message = report.error_message();
            return Err(match report.failed_stage() {
                stage::IMPORT => ImportError::Rejected {
                    path: request.model_path,
                    message,
                }
                .into(),
                other => BlenderError::capture_failed(other, message).into(),
            });
        }

        if !self.announced_version {
            if let Some(version) = report.blender_version.as_deref() {
                info!(version, "using Blender");
            }
            self.announced_version = true;
        }

        let rendered = report.output_path.unwrap_or(output_path);
        if !rendered.exists() {
            return Err(BlenderError::OutputNotFound { path: rendered }.into());
        }
        let image = read_png(&rendered)?;
        if (image.width, image.height) != (width, height) {
            return Err(RenderError::SizeMismatch {
                expected: [width, height],
                actual: [image.width, image.height],
            });
        }

        debug!(
            model = %request.model_path.display(),
            yaw = request.camera.setup.yaw,
            duration_ms = report.duration_ms,
            "capture rendered"
        );
        Ok(RenderedImage {
            image,
            bounds: report.bounds,
        })
    }
}
