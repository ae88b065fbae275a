//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::direction::Rotations;
use crate::error::InvalidConfig;

/// Pitch below which framing becomes noticeably oblique.
pub const RECOMMENDED_MIN_PITCH: f64 = 55.0;

/// Immutable camera, canvas and lighting settings shared by every capture in a batch.
///
/// Field names match the keys accepted in JSON config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Camera pitch in degrees from horizontal (90 = top-down).
    pub camera_angle: f64,
    /// Camera yaw offset in degrees, normalized mod 360 when planning.
    pub camera_yaw: f64,
    /// World-unit width/height of the orthographic frustum.
    pub ortho_scale: f64,
    /// Output pixels per world unit.
    pub pixels_per_unit: f64,
    /// Anti-aliasing sample count, passed through to the renderer.
    pub samples: u32,
    /// Number of directional captures per model (1 or 4).
    pub rotations: u32,
    /// Uniform scale applied to imported models.
    pub scale_factor: f64,
    /// Sun light intensity.
    pub light_strength: f64,
    /// Sun light tilt in degrees.
    pub light_angle_x: f64,
    /// Sun light heading in degrees.
    pub light_angle_z: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            camera_angle: 55.0,
            camera_yaw: 0.0,
            ortho_scale: 4.0,
            pixels_per_unit: 256.0,
            samples: 64,
            rotations: 1,
            scale_factor: 1.0,
            light_strength: 3.0,
            light_angle_x: 45.0,
            light_angle_z: 315.0,
        }
    }
}

impl RenderConfig {
    /// Checks every field that planning depends on.
    ///
    /// The first offending field is reported.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        finite("camera_angle", self.camera_angle)?;
        if !(0.0..=90.0).contains(&self.camera_angle) {
            return Err(InvalidConfig::new(
                "camera_angle",
                format!("must be within 0..=90 degrees, got {}", self.camera_angle),
            ));
        }
        finite("camera_yaw", self.camera_yaw)?;
        positive("ortho_scale", self.ortho_scale)?;
        positive("pixels_per_unit", self.pixels_per_unit)?;
        positive("scale_factor", self.scale_factor)?;
        positive("light_strength", self.light_strength)?;
        finite("light_angle_x", self.light_angle_x)?;
        finite("light_angle_z", self.light_angle_z)?;
        if self.samples == 0 {
            return Err(InvalidConfig::new("samples", "must be at least 1"));
        }
        Rotations::from_count(self.rotations)?;
        self.canvas_size()?;
        Ok(())
    }

    /// Square canvas edge in pixels: `round(ortho_scale * pixels_per_unit)`.
    pub fn canvas_size(&self) -> Result<u32, InvalidConfig> {
        let product = self.ortho_scale * self.pixels_per_unit;
        if !product.is_finite() || product <= 0.0 {
            return Err(InvalidConfig::new(
                "pixels_per_unit",
                format!(
                    "canvas size ortho_scale * pixels_per_unit must be positive and finite, got {}",
                    product
                ),
            ));
        }

        let rounded = product.round();
        if rounded < 1.0 || rounded > u32::MAX as f64 {
            return Err(InvalidConfig::new(
                "pixels_per_unit",
                format!("canvas size {} rounds outside 1..={} pixels", product, u32::MAX),
            ));
        }
        Ok(rounded as u32)
    }

    /// Non-fatal notes about settings that are legal but likely unintended.
    pub fn advisories(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.camera_angle.is_finite() && self.camera_angle < RECOMMENDED_MIN_PITCH {
            notes.push(format!(
                "camera_angle {}° is below the recommended {}°; sprites will be framed obliquely",
                self.camera_angle, RECOMMENDED_MIN_PITCH
            ));
        }
        notes
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidConfig::new(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(InvalidConfig::new(field, format!("must be positive, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas_size().unwrap(), 1024);
        assert!(config.advisories().is_empty());
    }

    #[test]
    fn test_canvas_size_rounds() {
        let config = RenderConfig {
            ortho_scale: 2.5,
            pixels_per_unit: 100.3,
            ..Default::default()
        };
        assert_eq!(config.canvas_size().unwrap(), 251);
    }

    #[test]
    fn test_canvas_rounding_to_zero_is_invalid() {
        let config = RenderConfig {
            ortho_scale: 0.1,
            pixels_per_unit: 4.0,
            ..Default::default()
        };
        let err = config.canvas_size().unwrap_err();
        assert_eq!(err.field, "pixels_per_unit");
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let config = RenderConfig {
            pixels_per_unit: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "pixels_per_unit");

        let config = RenderConfig {
            camera_yaw: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "camera_yaw");
    }

    #[test]
    fn test_pitch_domain() {
        for pitch in [-1.0, 90.5] {
            let config = RenderConfig {
                camera_angle: pitch,
                ..Default::default()
            };
            assert_eq!(config.validate().unwrap_err().field, "camera_angle");
        }

        let config = RenderConfig {
            camera_angle: 30.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.advisories().len(), 1);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let config = RenderConfig {
            samples: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "samples");
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"rotations": 4, "camera_angle": 90.0}"#).unwrap();
        assert_eq!(config.rotations, 4);
        assert_eq!(config.camera_angle, 90.0);
        assert_eq!(config.ortho_scale, 4.0);
        assert_eq!(config.samples, 64);
    }
}
