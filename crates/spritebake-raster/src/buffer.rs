//! RGBA image buffer.

use crate::error::RasterError;

/// A transparent black pixel.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// An 8-bit-per-channel RGBA raster, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    data: Vec<u8>,
}

impl RgbaImage {
    /// Create a new image filled with one color.
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Create a new fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, TRANSPARENT)
    }

    /// Wrap raw RGBA bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RasterError::InvalidDimensions(format!(
                "Expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning its raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&pixel);
    }

    /// Alpha channel at the given coordinates.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y) + 3]
    }

    /// One row of pixels as raw bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.index(0, y);
        &self.data[start..start + self.width as usize * 4]
    }

    /// Mutable row of pixels as raw bytes.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = self.index(0, y);
        let len = self.width as usize * 4;
        &mut self.data[start..start + len]
    }

    /// True when no pixel has a non-zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_set() {
        let mut img = RgbaImage::transparent(3, 2);
        assert_eq!(img.as_raw().len(), 24);
        assert!(img.is_fully_transparent());

        img.set(2, 1, [10, 20, 30, 255]);
        assert_eq!(img.get(2, 1), [10, 20, 30, 255]);
        assert_eq!(img.alpha(2, 1), 255);
        assert_eq!(img.alpha(0, 0), 0);
        assert!(!img.is_fully_transparent());
        assert_eq!(&img.row(1)[8..12], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(RgbaImage::from_raw(2, 2, vec![0; 16]).is_ok());
        let err = RgbaImage::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("Expected 16 bytes"));
    }
}
