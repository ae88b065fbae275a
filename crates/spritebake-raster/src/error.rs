//! Error types for raster operations and sprite cropping.

use std::path::PathBuf;

use spritebake_spec::BackendError;
use thiserror::Error;

/// Errors from PNG I/O and raster primitives.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Unsupported PNG color type {0:?}")]
    UnsupportedColorType(png::ColorType),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError for RasterError {
    fn code(&self) -> &'static str {
        match self {
            RasterError::Io(_) => "RASTER_001",
            RasterError::Encoding(_) => "RASTER_002",
            RasterError::Decoding(_) => "RASTER_003",
            RasterError::InvalidDimensions(_) => "RASTER_004",
            RasterError::UnsupportedColorType(_) => "RASTER_005",
            RasterError::Persist { .. } => "RASTER_006",
        }
    }

    fn category(&self) -> &'static str {
        "raster"
    }
}

/// Errors from the auto-crop pipeline.
#[derive(Debug, Error)]
pub enum CropError {
    /// The image has no pixel with alpha above zero.
    #[error("Sprite is fully transparent ({width}x{height}); nothing to crop")]
    EmptySprite { width: u32, height: u32 },

    /// Reading, writing or reshaping the image failed.
    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl CropError {
    /// True for the non-fatal fully-transparent case.
    pub fn is_empty_sprite(&self) -> bool {
        matches!(self, CropError::EmptySprite { .. })
    }
}

impl BackendError for CropError {
    fn code(&self) -> &'static str {
        match self {
            CropError::EmptySprite { .. } => "CROP_001",
            CropError::Raster(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        "crop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sprite_display() {
        let err = CropError::EmptySprite {
            width: 64,
            height: 32,
        };
        assert!(err.to_string().contains("fully transparent"));
        assert!(err.to_string().contains("64x32"));
        assert!(err.is_empty_sprite());
        assert_eq!(err.code(), "CROP_001");
    }

    #[test]
    fn test_raster_code_passthrough() {
        let err = CropError::from(RasterError::InvalidDimensions("0x0".into()));
        assert!(!err.is_empty_sprite());
        assert_eq!(err.code(), "RASTER_004");
        assert_eq!(err.category(), "crop");
    }
}
