//! Sprite metadata sidecars.
//!
//! One JSON document is written next to every sprite so that engine import
//! tooling can place the sprite at the right world scale.

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::direction::Direction;
use crate::plan::{Capture, CapturePlan};

/// Axis-aligned world-space bounds of the imported model, as measured by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl ObjectBounds {
    /// Creates bounds from min/max corners.
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Width, depth and height of the box.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Center of the box.
    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Grows the box to include a point.
    pub fn include(&mut self, point: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }
}

/// How the auto-crop pass reshaped a sprite.
///
/// All sizes are `[width, height]`, offsets `[x, y]` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInfo {
    /// Rendered canvas size before cropping.
    pub original_size: [u32; 2],
    /// Top-left of the trimmed box within the rendered canvas.
    pub crop_offset: [u32; 2],
    /// Size of the trimmed content box.
    pub cropped_size: [u32; 2],
    /// Size after adding the transparent border.
    pub padded_size: [u32; 2],
    /// Power-of-two size written to disk.
    pub final_size: [u32; 2],
    /// Top-left of the trimmed content within the final image.
    pub content_offset: [u32; 2],
}

/// Metadata written alongside each sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteMetadata {
    /// Model the sprite was rendered from.
    pub source: String,
    /// Camera yaw in degrees.
    pub capture_angle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Camera pitch in degrees.
    pub camera_pitch: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub ortho_scale: f64,
    pub pixels_per_unit: f64,
    /// Rendered pixels per world unit after canvas rounding.
    pub world_to_pixel: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_bounds: Option<ObjectBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropInfo>,
}

impl SpriteMetadata {
    /// Metadata for one capture, before bounds or crop information is known.
    pub fn for_capture(
        source: impl Into<String>,
        config: &RenderConfig,
        plan: &CapturePlan,
        capture: &Capture,
    ) -> Self {
        Self {
            source: source.into(),
            capture_angle: capture.yaw,
            direction: capture.direction,
            camera_pitch: plan.camera.pitch,
            canvas_width: plan.canvas_width_px,
            canvas_height: plan.canvas_height_px,
            ortho_scale: config.ortho_scale,
            pixels_per_unit: config.pixels_per_unit,
            world_to_pixel: plan.canvas_width_px as f64 / config.ortho_scale,
            object_bounds: None,
            crop: None,
        }
    }

    /// Attaches renderer-measured bounds.
    pub fn with_bounds(mut self, bounds: Option<ObjectBounds>) -> Self {
        self.object_bounds = bounds;
        self
    }

    /// Attaches the crop report.
    pub fn with_crop(mut self, crop: Option<CropInfo>) -> Self {
        self.crop = crop;
        self
    }

    /// Pretty-printed JSON for the sidecar file.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
