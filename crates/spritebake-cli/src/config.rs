//! Batch configuration.
//!
//! Settings are layered: built-in defaults, then an optional JSON config
//! file, then command-line flags. The merged result is validated once
//! before any job starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spritebake_spec::{BackendError, InvalidConfig, RenderConfig};
use thiserror::Error;

/// Model extensions discovered by default.
pub const DEFAULT_FORMATS: &[&str] = &[".gltf", ".glb", ".obj", ".fbx"];

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./rendered_sprites";

/// Everything a batch run needs.
///
/// Unknown keys in a JSON config file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory searched recursively for models.
    pub input_dir: PathBuf,
    /// Root of the mirrored output tree.
    pub output_dir: PathBuf,
    /// Camera, canvas and lighting settings.
    #[serde(flatten)]
    pub render: RenderConfig,
    /// Model extensions to discover, e.g. `.glb`.
    pub formats: Vec<String>,
    /// Leave captures whose sprite already exists untouched.
    pub skip_existing: bool,
    /// Trim and power-of-two expand each sprite after rendering.
    pub auto_crop: bool,
    pub verbose: bool,
    /// Additional DEBUG-level log file.
    pub log_file: Option<PathBuf>,
    /// Models rendered concurrently, each with its own Blender process.
    pub jobs: usize,
    /// Per-capture Blender time limit. Unlimited when absent.
    pub timeout_secs: Option<u64>,
    /// Explicit Blender executable.
    pub blender_path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            render: RenderConfig::default(),
            formats: DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
            skip_existing: false,
            auto_crop: true,
            verbose: false,
            log_file: None,
            jobs: 1,
            timeout_secs: None,
            blender_path: None,
        }
    }
}

/// Errors loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] InvalidConfig),
}

impl BackendError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CONFIG_002",
            ConfigError::Parse { .. } => "CONFIG_003",
            ConfigError::Invalid(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}

impl BatchConfig {
    /// Defaults overlaid with the keys present in a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Defaults overlaid with the keys present in `json`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies the layers in order: file (if any), then flag overrides.
    pub fn load(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        overrides.apply(&mut config);
        config.normalize_formats();
        Ok(config)
    }

    /// Lowercases formats and ensures each has a leading dot.
    pub fn normalize_formats(&mut self) {
        for format in &mut self.formats {
            let lower = format.trim().to_lowercase();
            *format = if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            };
        }
        self.formats.dedup();
    }

    /// Checks the merged configuration.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        self.render.validate()?;
        if self.input_dir.as_os_str().is_empty() {
            return Err(InvalidConfig::new("input_dir", "is required"));
        }
        if self.formats.is_empty() {
            return Err(InvalidConfig::new("formats", "must list at least one extension"));
        }
        if self.jobs == 0 {
            return Err(InvalidConfig::new("jobs", "must be at least 1"));
        }
        if self.timeout_secs == Some(0) {
            return Err(InvalidConfig::new("timeout_secs", "must be positive when set"));
        }
        Ok(())
    }
}

/// Values given on the command line. `None` or `false` leaves the lower
/// layer untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub camera_angle: Option<f64>,
    pub camera_yaw: Option<f64>,
    pub ortho_scale: Option<f64>,
    pub pixels_per_unit: Option<f64>,
    pub samples: Option<u32>,
    pub rotations: Option<u32>,
    pub scale_factor: Option<f64>,
    pub light_strength: Option<f64>,
    pub light_angle_x: Option<f64>,
    pub light_angle_z: Option<f64>,
    pub formats: Option<Vec<String>>,
    pub skip_existing: bool,
    pub no_auto_crop: bool,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub blender_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Writes every set value into `config`.
    pub fn apply(self, config: &mut BatchConfig) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut config.input_dir, self.input_dir);
        set(&mut config.output_dir, self.output_dir);
        set(&mut config.render.camera_angle, self.camera_angle);
        set(&mut config.render.camera_yaw, self.camera_yaw);
        set(&mut config.render.ortho_scale, self.ortho_scale);
        set(&mut config.render.pixels_per_unit, self.pixels_per_unit);
        set(&mut config.render.samples, self.samples);
        set(&mut config.render.rotations, self.rotations);
        set(&mut config.render.scale_factor, self.scale_factor);
        set(&mut config.render.light_strength, self.light_strength);
        set(&mut config.render.light_angle_x, self.light_angle_x);
        set(&mut config.render.light_angle_z, self.light_angle_z);
        set(&mut config.formats, self.formats);
        set(&mut config.jobs, self.jobs);

        if self.skip_existing {
            config.skip_existing = true;
        }
        if self.no_auto_crop {
            config.auto_crop = false;
        }
        if self.verbose {
            config.verbose = true;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        if self.blender_path.is_some() {
            config.blender_path = self.blender_path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_original_tool() {
        let config = BatchConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./rendered_sprites"));
        assert_eq!(config.formats, vec![".gltf", ".glb", ".obj", ".fbx"]);
        assert!(config.auto_crop);
        assert!(!config.skip_existing);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_json_flat_keys_and_unknown_keys() {
        let config = BatchConfig::from_json_str(
            r#"{
                "input_dir": "models",
                "camera_angle": 60,
                "rotations": 4,
                "auto_crop": false,
                "resolution": 512,
                "min_canvas_size": 256
            }"#,
        )
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("models"));
        assert_eq!(config.render.camera_angle, 60.0);
        assert_eq!(config.render.rotations, 4);
        assert_eq!(config.render.ortho_scale, 4.0);
        assert!(!config.auto_crop);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        std::fs::write(&path, r#"{"input_dir": "a", "samples": 16, "skip_existing": true}"#)
            .unwrap();

        let overrides = ConfigOverrides {
            input_dir: Some(PathBuf::from("b")),
            samples: Some(128),
            no_auto_crop: true,
            formats: Some(vec!["GLB".into(), ".obj".into()]),
            ..Default::default()
        };
        let config = BatchConfig::load(Some(&path), overrides).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("b"));
        assert_eq!(config.render.samples, 128);
        assert!(config.skip_existing);
        assert!(!config.auto_crop);
        assert_eq!(config.formats, vec![".glb", ".obj"]);
    }

    #[test]
    fn test_missing_config_file() {
        let err = BatchConfig::load(Some(Path::new("/nonexistent/cfg.json")), Default::default())
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_002");
    }

    #[test]
    fn test_validate() {
        let mut config = BatchConfig::default();
        assert_eq!(config.validate().unwrap_err().field, "input_dir");

        config.input_dir = PathBuf::from("models");
        config.validate().unwrap();

        config.render.rotations = 2;
        assert_eq!(config.validate().unwrap_err().field, "rotations");

        config.render.rotations = 1;
        config.jobs = 0;
        assert_eq!(config.validate().unwrap_err().field, "jobs");
    }
}
