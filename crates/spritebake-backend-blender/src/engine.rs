//! The render engine seam.
//!
//! The batch layer talks to any renderer through [`RenderEngine`]. Scene
//! state is an explicit [`SceneHandle`] value rather than hidden engine
//! state: [`RenderEngine::reset_scene`] hands out a fresh handle, and every
//! other operation takes the handle it acts on. Two workers that each own an
//! engine and a handle share nothing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spritebake_raster::RgbaImage;
use spritebake_spec::{CameraPlacement, ObjectBounds, RenderConfig};

use crate::error::{ImportError, RenderError};

/// Model extensions the engine can import (lowercase, with dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".gltf", ".glb", ".obj", ".fbx"];

/// Orthographic camera for one capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    /// Horizontal distance from the object center.
    pub distance: f64,
    /// Height above the object center.
    pub height: f64,
    /// Pitch in degrees from horizontal.
    pub pitch: f64,
    /// Yaw in degrees.
    pub yaw: f64,
    /// Orthographic frustum size in world units.
    pub ortho_scale: f64,
}

impl CameraSetup {
    /// Camera for `yaw` from a planned placement.
    pub fn from_placement(placement: &CameraPlacement, yaw: f64, ortho_scale: f64) -> Self {
        Self {
            distance: placement.distance,
            height: placement.height,
            pitch: placement.pitch,
            yaw,
            ortho_scale,
        }
    }

    /// World-space offset of the camera from the object center.
    pub fn offset(&self) -> [f64; 3] {
        CameraPlacement {
            distance: self.distance,
            height: self.height,
            pitch: self.pitch,
        }
        .offset_for_yaw(self.yaw)
    }
}

/// Directional sun light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSetup {
    pub strength: f64,
    /// Tilt in degrees.
    pub angle_x: f64,
    /// Heading in degrees.
    pub angle_z: f64,
}

impl LightSetup {
    /// Light settings from a render configuration.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            strength: config.light_strength,
            angle_x: config.light_angle_x,
            angle_z: config.light_angle_z,
        }
    }
}

/// A model placed in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedModel {
    pub path: PathBuf,
    pub scale_factor: f64,
}

/// Everything one capture needs, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneHandle {
    /// Increments on every reset; distinguishes handles from the same engine.
    pub generation: u64,
    pub model: Option<ImportedModel>,
    pub camera: Option<CameraSetup>,
    pub light: Option<LightSetup>,
}

impl SceneHandle {
    /// An empty scene.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            model: None,
            camera: None,
            light: None,
        }
    }
}

/// One rendered capture.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub image: RgbaImage,
    /// World-space bounds of the imported model, when the engine measures them.
    pub bounds: Option<ObjectBounds>,
}

/// A renderer that turns a scene into an RGBA image.
///
/// Implementations are driven strictly in the order reset, import,
/// configure, render for every capture.
pub trait RenderEngine {
    /// Discards all scene state and returns a fresh, empty handle.
    fn reset_scene(&mut self) -> SceneHandle;

    /// Imports a model into `scene`, scaled uniformly by `scale_factor`.
    fn import_model(
        &mut self,
        scene: &mut SceneHandle,
        path: &Path,
        scale_factor: f64,
    ) -> Result<(), ImportError>;

    /// Positions the orthographic camera.
    fn configure_camera(&mut self, scene: &mut SceneHandle, camera: CameraSetup);

    /// Sets up the directional light.
    fn configure_light(&mut self, scene: &mut SceneHandle, light: LightSetup);

    /// Renders the scene. Blocks until the capture finishes.
    fn render_to_image(
        &mut self,
        scene: &SceneHandle,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<RenderedImage, RenderError>;
}

/// Lowercase dotted extension of `path`, e.g. `".glb"`.
pub fn model_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
