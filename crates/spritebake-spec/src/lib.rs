//! Spritebake Spec Library
//!
//! Configuration, capture planning and metadata types for the Spritebake
//! 3D-to-sprite batch renderer. Nothing in this crate performs I/O; the
//! renderer and raster crates consume these values.
//!
//! # Example
//!
//! ```
//! use spritebake_spec::{plan, RenderConfig};
//!
//! let config = RenderConfig {
//!     rotations: 4,
//!     ..Default::default()
//! };
//! let plan = plan(&config).unwrap();
//!
//! assert_eq!(plan.canvas_width_px, 1024);
//! assert_eq!(plan.yaw_angles(), vec![0.0, 90.0, 180.0, 270.0]);
//! ```
//!
//! # Modules
//!
//! - [`config`]: Render configuration and validation
//! - [`direction`]: Compass directions and rotation modes
//! - [`plan`]: Canvas, camera and yaw planning
//! - [`job`]: Capture jobs and output naming
//! - [`metadata`]: Sprite metadata sidecars
//! - [`error`]: Shared error trait and `InvalidConfig`

pub mod config;
pub mod direction;
pub mod error;
pub mod job;
pub mod metadata;
pub mod plan;

pub use config::{RenderConfig, RECOMMENDED_MIN_PITCH};
pub use direction::{Direction, Rotations, FOUR_WAY};
pub use error::{BackendError, InvalidConfig};
pub use job::{jobs_for_model, CaptureJob};
pub use metadata::{CropInfo, ObjectBounds, SpriteMetadata};
pub use plan::{normalize_degrees, plan, CameraPlacement, Capture, CapturePlan};
