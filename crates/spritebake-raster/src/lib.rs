//! Spritebake Raster Backend
//!
//! Raster operations for rendered sprites: an RGBA buffer type, deterministic
//! PNG I/O with atomic file replacement, and the auto-crop pipeline that
//! trims transparent borders and expands sprites to power-of-two sizes.
//!
//! # Example
//!
//! ```
//! use spritebake_raster::{crop_sprite, RgbaImage, SPRITE_PADDING};
//!
//! let mut image = RgbaImage::transparent(512, 512);
//! image.set(100, 100, [255, 255, 255, 255]);
//!
//! let sprite = crop_sprite(image, SPRITE_PADDING).unwrap();
//! assert_eq!(sprite.info.padded_size, [9, 9]);
//! assert_eq!(sprite.info.final_size, [16, 16]);
//! ```
//!
//! # Crate Structure
//!
//! - [`buffer`] - RGBA image buffer
//! - [`png`] - PNG decoding and deterministic encoding
//! - [`atomic`] - Write-then-rename file replacement
//! - [`ops`] - Bounding box, crop, pad and centered composite primitives
//! - [`crop`] - The trim / pad / power-of-two pipeline
//! - [`error`] - Error types

pub mod atomic;
pub mod buffer;
pub mod crop;
pub mod error;
pub mod ops;
pub mod png;

pub use atomic::write_atomic;
pub use buffer::{RgbaImage, TRANSPARENT};
pub use crop::{crop_file, crop_sprite, next_pow2, Expanded, Loaded, PaddingSpec, SPRITE_PADDING};
pub use error::{CropError, RasterError};
pub use ops::{bounding_box, composite_centered, crop, pad_transparent, Rect};
pub use self::png::{decode_png, encode_rgba, read_png, write_png, PngConfig};
