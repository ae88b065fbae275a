//! Capture geometry planning.
//!
//! [`plan`] maps a [`RenderConfig`] to the canvas size, the orbit camera
//! placement and the list of yaw angles to capture. It is a pure function of
//! its input: the same configuration always yields a bit-identical plan, which
//! is what makes batch renders reproducible and skip-existing resumes safe.

use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::direction::{Direction, Rotations, FOUR_WAY};
use crate::error::InvalidConfig;

/// Orbit radius in world units per unit of orthographic scale.
///
/// A 4-unit frustum gives a 10-unit orbit.
pub const ORBIT_RADIUS_PER_UNIT: f64 = 2.5;

/// Where the camera sits relative to the framed object's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    /// Horizontal distance from the object center.
    pub distance: f64,
    /// Height above the object center.
    pub height: f64,
    /// Pitch in degrees from horizontal.
    pub pitch: f64,
}

impl CameraPlacement {
    /// World-space offset `[x, y, z]` from the object center for a given yaw.
    ///
    /// Yaw 0 puts the camera on the -Y side looking north; increasing yaw
    /// orbits counter-clockwise seen from above.
    pub fn offset_for_yaw(&self, yaw_degrees: f64) -> [f64; 3] {
        let yaw = yaw_degrees.to_radians();
        [
            -self.distance * yaw.sin(),
            -self.distance * yaw.cos(),
            self.height,
        ]
    }
}

/// One planned capture angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// Camera yaw in degrees, within `[0, 360)`.
    pub yaw: f64,
    /// Facing direction; `None` in single-rotation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl Capture {
    /// File name suffix, e.g. `"_e"`, or empty for single-rotation captures.
    pub fn file_suffix(&self) -> String {
        match self.direction {
            Some(direction) => format!("_{}", direction.suffix()),
            None => String::new(),
        }
    }
}

/// Full geometry for every capture of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePlan {
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub camera: CameraPlacement,
    pub captures: Vec<Capture>,
}

impl CapturePlan {
    /// Yaw angles in capture order.
    pub fn yaw_angles(&self) -> Vec<f64> {
        self.captures.iter().map(|c| c.yaw).collect()
    }
}

/// Normalizes an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Plans canvas, camera and yaw angles for a configuration.
pub fn plan(config: &RenderConfig) -> Result<CapturePlan, InvalidConfig> {
    config.validate()?;
    let canvas = config.canvas_size()?;

    let radius = ORBIT_RADIUS_PER_UNIT * config.ortho_scale;
    let pitch = config.camera_angle.to_radians();
    let camera = CameraPlacement {
        distance: radius * pitch.cos(),
        height: radius * pitch.sin(),
        pitch: config.camera_angle,
    };

    let captures = match Rotations::from_count(config.rotations)? {
        Rotations::Single => vec![Capture {
            yaw: normalize_degrees(config.camera_yaw),
            direction: None,
        }],
        Rotations::FourWay => FOUR_WAY
            .iter()
            .map(|&direction| Capture {
                yaw: normalize_degrees(config.camera_yaw + direction.yaw_step()),
                direction: Some(direction),
            })
            .collect(),
    };

    Ok(CapturePlan {
        canvas_width_px: canvas,
        canvas_height_px: canvas,
        camera,
        captures,
    })
}
