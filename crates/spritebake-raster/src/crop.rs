//! Auto-crop to power-of-two.
//!
//! Every rendered sprite goes through four strictly sequential stages:
//!
//! 1. **Loaded** - the image is read and must contain at least one pixel
//!    with alpha above zero, otherwise [`CropError::EmptySprite`].
//! 2. **Trimmed** - cropped to the bounding box of non-transparent pixels.
//! 3. **Padded** - a fixed transparent border is added on every side.
//! 4. **Expanded** - each axis is grown to the next power of two and the
//!    padded image is centered on the new canvas.
//!
//! The stages are separate types so they can only be applied in order.

use std::path::Path;

use spritebake_spec::CropInfo;
use tracing::debug;

use crate::buffer::RgbaImage;
use crate::error::{CropError, RasterError};
use crate::ops::{bounding_box, center_offset, composite_centered, crop, pad_transparent, Rect};
use crate::png::{read_png, write_png, PngConfig};

/// Transparent border policy applied after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingSpec {
    /// Border width in pixels, uniform on all sides.
    pub pixels: u32,
}

/// The fixed 4-pixel border used for every sprite.
pub const SPRITE_PADDING: PaddingSpec = PaddingSpec { pixels: 4 };

/// Largest power of two representable in `u32`.
const MAX_POW2: u32 = 1 << 31;

/// Smallest power of two `>= n`; `next_pow2(0) == 1`.
///
/// # Panics
///
/// Panics if `n > 2^31`.
pub fn next_pow2(n: u32) -> u32 {
    let mut p = 1u32;
    while p < n {
        p *= 2;
    }
    p
}

/// A decoded sprite known to have visible content.
#[derive(Debug)]
pub struct Loaded {
    image: RgbaImage,
    bbox: Rect,
}

impl Loaded {
    /// Accepts an image, rejecting fully transparent ones.
    pub fn new(image: RgbaImage) -> Result<Self, CropError> {
        match bounding_box(&image) {
            Some(bbox) => Ok(Self { image, bbox }),
            None => Err(CropError::EmptySprite {
                width: image.width,
                height: image.height,
            }),
        }
    }

    /// Reads and accepts a PNG file.
    pub fn read(path: &Path) -> Result<Self, CropError> {
        Self::new(read_png(path)?)
    }

    /// Bounding box of the visible content.
    pub fn content_box(&self) -> Rect {
        self.bbox
    }

    /// Crops to the content bounding box.
    pub fn trim(self) -> Result<Trimmed, CropError> {
        let image = crop(&self.image, self.bbox)?;
        Ok(Trimmed {
            image,
            original_size: [self.image.width, self.image.height],
            bbox: self.bbox,
        })
    }
}

/// A sprite cropped to its content.
#[derive(Debug)]
pub struct Trimmed {
    image: RgbaImage,
    original_size: [u32; 2],
    bbox: Rect,
}

impl Trimmed {
    /// Adds the transparent border.
    pub fn pad(self, padding: PaddingSpec) -> Result<Padded, CropError> {
        let image = pad_transparent(&self.image, padding.pixels)?;
        Ok(Padded {
            image,
            trimmed: self,
            padding,
        })
    }
}

/// A trimmed sprite with its border.
#[derive(Debug)]
pub struct Padded {
    image: RgbaImage,
    trimmed: Trimmed,
    padding: PaddingSpec,
}

impl Padded {
    /// Centers the padded sprite on a power-of-two canvas.
    pub fn expand(self) -> Result<Expanded, CropError> {
        let (width, height) = (self.image.width, self.image.height);
        if width > MAX_POW2 || height > MAX_POW2 {
            return Err(RasterError::InvalidDimensions(format!(
                "Padded sprite {}x{} has no u32 power-of-two size",
                width, height
            ))
            .into());
        }
        let target_w = next_pow2(width);
        let target_h = next_pow2(height);

        let image = if (target_w, target_h) == (width, height) {
            self.image
        } else {
            composite_centered(&self.image, target_w, target_h)?
        };

        let info = CropInfo {
            original_size: self.trimmed.original_size,
            crop_offset: [self.trimmed.bbox.x, self.trimmed.bbox.y],
            cropped_size: [self.trimmed.bbox.width, self.trimmed.bbox.height],
            padded_size: [width, height],
            final_size: [target_w, target_h],
            content_offset: [
                center_offset(width, target_w) + self.padding.pixels,
                center_offset(height, target_h) + self.padding.pixels,
            ],
        };

        Ok(Expanded { image, info })
    }
}

/// Terminal stage: the power-of-two sprite and how it was produced.
#[derive(Debug)]
pub struct Expanded {
    /// The final image.
    pub image: RgbaImage,
    /// Crop report for metadata sidecars.
    pub info: CropInfo,
}

/// Runs the whole pipeline on an in-memory image.
pub fn crop_sprite(image: RgbaImage, padding: PaddingSpec) -> Result<Expanded, CropError> {
    Loaded::new(image)?.trim()?.pad(padding)?.expand()
}

/// Crops the PNG at `path` in place.
///
/// The result replaces the file atomically. If cropping would not change
/// any pixel the file is left untouched. A fully transparent sprite fails
/// with [`CropError::EmptySprite`] and is also left untouched.
pub fn crop_file(path: &Path, config: &PngConfig) -> Result<CropInfo, CropError> {
    let original = read_png(path)?;
    let expanded = crop_sprite(original.clone(), SPRITE_PADDING)?;

    if expanded.image == original {
        debug!(path = %path.display(), "sprite already cropped");
        return Ok(expanded.info);
    }

    write_png(&expanded.image, path, config)?;
    debug!(
        path = %path.display(),
        from = ?expanded.info.original_size,
        to = ?expanded.info.final_size,
        "cropped sprite"
    );
    Ok(expanded.info)
}
