//! Grayscale conversion
//!
//! Handles MONOCHROME1 and MONOCHROME2 at 8 and 16 bits allocated. The
//! output is a single-channel raster.

use super::normalization::{samples_to_u8, unpack_samples};
use super::RasterImage;
use crate::dicom::{DecodeError, PixelDescriptor};

/// Convert one frame of grayscale samples to an 8-bit raster
///
/// # Errors
///
/// Returns an error if the frame does not hold `rows * cols` samples
pub fn convert_grayscale(
    descriptor: &PixelDescriptor,
    frame: &[u8],
) -> Result<RasterImage, DecodeError> {
    let samples = unpack_samples(frame, descriptor);
    let mut gray = samples_to_u8(&samples, descriptor);

    // MONOCHROME1: min = white, max = black
    if descriptor.photometric_interpretation.should_invert() {
        for v in &mut gray {
            *v = 255 - *v;
        }
    }

    let (width, height) = (u32::from(descriptor.cols()), u32::from(descriptor.rows()));
    RasterImage::from_raw(width, height, 1, gray).ok_or_else(|| {
        DecodeError::InconsistentPixelMetadata(format!(
            "grayscale frame does not match {}",
            descriptor.dimensions
        ))
    })
}
