//! PNG encoding of decoded rasters

use super::RasterImage;
use crate::dicom::EncodeError;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

/// Encode `raster` as an 8-bit grayscale or RGB PNG.
///
/// Compression and filter settings are fixed, so equal rasters always yield
/// identical bytes.
///
/// # Errors
///
/// Returns an error for channel counts other than 1 or 3, or if the encoder fails
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    let color_type = match raster.channel_count() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        n => return Err(EncodeError::UnsupportedChannelCount(n)),
    };

    let mut out = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut out, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(raster.pixels(), raster.width(), raster.height(), color_type)?;
    Ok(out)
}
