//! PNG reading and deterministic PNG writing.
//!
//! Encoding uses fixed compression and filter settings so the same image
//! always produces the same bytes.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType, Transformations};

use crate::atomic::write_atomic;
use crate::buffer::RgbaImage;
use crate::error::RasterError;

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Create config optimized for file size (slower, but deterministic).
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }
}

/// Write an RGBA image as PNG to any writer.
pub fn write_rgba_to_writer<W: Write>(
    image: &RgbaImage,
    writer: W,
    config: &PngConfig,
) -> Result<(), RasterError> {
    if image.width == 0 || image.height == 0 {
        return Err(RasterError::InvalidDimensions(format!(
            "Cannot encode {}x{} image",
            image.width, image.height
        )));
    }

    let mut encoder = Encoder::new(writer, image.width, image.height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(image.as_raw())?;
    png_writer.finish()?;

    Ok(())
}

/// Encode an RGBA image to PNG bytes.
pub fn encode_rgba(image: &RgbaImage, config: &PngConfig) -> Result<Vec<u8>, RasterError> {
    let mut buffer = Vec::new();
    write_rgba_to_writer(image, &mut buffer, config)?;
    Ok(buffer)
}

/// Write an RGBA image to `path`, replacing any existing file atomically.
pub fn write_png(image: &RgbaImage, path: &Path, config: &PngConfig) -> Result<(), RasterError> {
    let bytes = encode_rgba(image, config)?;
    write_atomic(path, &bytes)
}

/// Decode PNG bytes into an RGBA image.
///
/// Palette, grayscale and 16-bit images are converted to 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, RasterError> {
    let mut decoder = Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut pixels = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut pixels)?;
    pixels.truncate(info.buffer_size());

    let rgba = match info.color_type {
        ColorType::Rgba => pixels,
        ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        ColorType::Grayscale => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => return Err(RasterError::UnsupportedColorType(other)),
    };

    RgbaImage::from_raw(info.width, info.height, rgba)
}

/// Read a PNG file into an RGBA image.
pub fn read_png(path: &Path) -> Result<RgbaImage, RasterError> {
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}
