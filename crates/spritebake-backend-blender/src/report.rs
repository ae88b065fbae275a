//! JSON documents exchanged with the Blender entrypoint.
//!
//! Rust writes one [`CaptureRequest`] per capture; the Python side answers
//! with a [`CaptureReport`] whether it succeeded or not.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use spritebake_spec::ObjectBounds;

use crate::engine::{CameraSetup, LightSetup};

/// Camera block of a request, with the world offset precomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRequest {
    #[serde(flatten)]
    pub setup: CameraSetup,
    /// Camera position relative to the object center.
    pub offset: [f64; 3],
}

impl From<CameraSetup> for CameraRequest {
    fn from(setup: CameraSetup) -> Self {
        Self {
            offset: setup.offset(),
            setup,
        }
    }
}

/// Everything the entrypoint needs to produce one sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub model_path: PathBuf,
    pub scale_factor: f64,
    pub camera: CameraRequest,
    pub light: LightSetup,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    /// Where Blender writes the RGBA PNG.
    pub output_path: PathBuf,
}

/// Stage names the entrypoint uses in failure reports.
pub mod stage {
    pub const IMPORT: &str = "import";
    pub const CAMERA: &str = "camera";
    pub const LIGHT: &str = "light";
    pub const RENDER: &str = "render";
}

/// Result written by the entrypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub ok: bool,
    /// Stage that failed, when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// World-space bounds after scaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ObjectBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blender_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl CaptureReport {
    /// Failing stage, defaulting to render.
    pub fn failed_stage(&self) -> &str {
        self.stage.as_deref().unwrap_or(stage::RENDER)
    }

    /// Failure message, or a generic one when the entrypoint gave none.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_json_shape() {
        let camera = CameraSetup {
            distance: 6.0,
            height: 8.0,
            pitch: 53.13,
            yaw: 0.0,
            ortho_scale: 4.0,
        };
        let request = CaptureRequest {
            model_path: PathBuf::from("in/crate.glb"),
            scale_factor: 1.0,
            camera: camera.into(),
            light: LightSetup {
                strength: 3.0,
                angle_x: 45.0,
                angle_z: 315.0,
            },
            width: 1024,
            height: 1024,
            samples: 64,
            output_path: PathBuf::from("out/render.png"),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["camera"]["ortho_scale"], 4.0);
        assert_eq!(value["camera"]["offset"][2], 8.0);
        assert!((value["camera"]["offset"][1].as_f64().unwrap() + 6.0).abs() < 1e-9);
        assert_eq!(value["light"]["angle_z"], 315.0);
    }

    #[test]
    fn test_parse_failure_report() {
        let report: CaptureReport = serde_json::from_str(
            r#"{"ok": false, "stage": "import", "error": "Unsupported FBX version"}"#,
        )
        .unwrap();
        assert!(!report.ok);
        assert_eq!(report.failed_stage(), "import");
        assert_eq!(report.error_message(), "Unsupported FBX version");
        assert!(report.bounds.is_none());
    }

    #[test]
    fn test_parse_success_report() {
        let report: CaptureReport = serde_json::from_str(
            r#"{
                "ok": true,
                "output_path": "/tmp/x/render.png",
                "bounds": {"min": [-1, -1, 0], "max": [1, 1, 2]},
                "blender_version": "4.1.0",
                "duration_ms": 812
            }"#,
        )
        .unwrap();
        assert!(report.ok);
        assert_eq!(report.bounds.unwrap().size(), [2.0, 2.0, 2.0]);
        assert_eq!(report.failed_stage(), "render");
    }
}
