//! Raster primitives used by the crop pipeline.

use crate::buffer::{RgbaImage, TRANSPARENT};
use crate::error::RasterError;

/// A pixel rectangle with top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Smallest rectangle enclosing every pixel with alpha above zero.
///
/// Returns `None` for a fully transparent (or empty) image.
pub fn bounding_box(image: &RgbaImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for y in 0..image.height {
        let row = image.row(y);
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] > 0 {
                let x = x as u32;
                found = true;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    found.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Copy out the pixels inside `rect`.
pub fn crop(image: &RgbaImage, rect: Rect) -> Result<RgbaImage, RasterError> {
    let fits = rect.width > 0
        && rect.height > 0
        && rect.x.checked_add(rect.width).is_some_and(|r| r <= image.width)
        && rect.y.checked_add(rect.height).is_some_and(|b| b <= image.height);
    if !fits {
        return Err(RasterError::InvalidDimensions(format!(
            "Crop rect {:?} outside {}x{} image",
            rect, image.width, image.height
        )));
    }

    let mut out = RgbaImage::transparent(rect.width, rect.height);
    let start = rect.x as usize * 4;
    let len = rect.width as usize * 4;
    for y in 0..rect.height {
        let src = &image.row(rect.y + y)[start..start + len];
        out.row_mut(y).copy_from_slice(src);
    }
    Ok(out)
}

/// Place `image` at `(x, y)` on a transparent canvas of the given size.
fn place(image: &RgbaImage, width: u32, height: u32, x: u32, y: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height, TRANSPARENT);
    let start = x as usize * 4;
    let len = image.width as usize * 4;
    for row in 0..image.height {
        out.row_mut(y + row)[start..start + len].copy_from_slice(image.row(row));
    }
    out
}

/// Surround `image` with a uniform transparent border.
pub fn pad_transparent(image: &RgbaImage, pixels: u32) -> Result<RgbaImage, RasterError> {
    let grow = |n: u32| {
        pixels
            .checked_mul(2)
            .and_then(|border| n.checked_add(border))
            .ok_or_else(|| {
                RasterError::InvalidDimensions(format!("Padding {} overflows size {}", pixels, n))
            })
    };
    let width = grow(image.width)?;
    let height = grow(image.height)?;
    Ok(place(image, width, height, pixels, pixels))
}

/// Offset that centers `inner` within `outer`.
///
/// When the leftover space is odd the extra pixel goes after the image
/// (right or bottom edge).
pub fn center_offset(inner: u32, outer: u32) -> u32 {
    (outer - inner) / 2
}

/// Center `image` on a transparent canvas of `width` x `height`.
///
/// The target must be at least as large as the image on both axes; the
/// image is never scaled.
pub fn composite_centered(
    image: &RgbaImage,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RasterError> {
    if width < image.width || height < image.height {
        return Err(RasterError::InvalidDimensions(format!(
            "Target {}x{} smaller than image {}x{}",
            width, height, image.width, image.height
        )));
    }
    let x = center_offset(image.width, width);
    let y = center_offset(image.height, height);
    Ok(place(image, width, height, x, y))
}
