//! Pixel data to raster conversion
//!
//! [`decode`] turns the native pixel data of a dataset into an 8-bit
//! [`RasterImage`]; [`render_to_raster`] additionally encodes it as PNG.

mod grayscale;
mod normalization;
pub mod png;
mod raster;
mod rgb;

pub use grayscale::convert_grayscale;
pub use png::encode_png;
pub use raster::RasterImage;
pub use rgb::convert_rgb;

use crate::dicom::{Dataset, DecodeError, PixelDescriptor, tags, validate_descriptor};
use tracing::debug;

/// Decode the first frame of a dataset's pixel data
///
/// # Errors
///
/// Returns an error if pixel attributes are missing or unsupported, if there
/// is no pixel data, or if the pixel data is shorter than one frame
pub fn decode(dataset: &Dataset) -> Result<RasterImage, DecodeError> {
    let descriptor = PixelDescriptor::from_dataset(dataset)?;

    let data = dataset
        .get(tags::PIXEL_DATA)
        .and_then(|e| e.value.as_bytes())
        .ok_or(DecodeError::NoPixelData)?;

    validate_descriptor(&descriptor)?;

    let frame = first_frame(data, &descriptor)?;

    debug!(
        dimensions = %descriptor.dimensions,
        bits = %descriptor.bit_depth,
        photometric = %descriptor.photometric_interpretation,
        frames = descriptor.number_of_frames,
        "decoding pixel data"
    );

    let photometric = &descriptor.photometric_interpretation;
    if photometric.is_grayscale() {
        convert_grayscale(&descriptor, frame)
    } else if photometric.is_rgb() {
        convert_rgb(&descriptor, frame)
    } else {
        Err(DecodeError::UnsupportedPhotometricInterpretation(photometric.to_string()))
    }
}

/// Decode a dataset's pixel data and encode it as PNG
///
/// # Errors
///
/// Returns any [`decode`] error, or [`DecodeError::Encode`] if PNG encoding fails
pub fn render_to_raster(dataset: &Dataset) -> Result<Vec<u8>, DecodeError> {
    let raster = decode(dataset)?;
    Ok(encode_png(&raster)?)
}

fn first_frame<'a>(data: &'a [u8], descriptor: &PixelDescriptor) -> Result<&'a [u8], DecodeError> {
    let expected = descriptor.frame_len();
    data.get(..expected).ok_or(DecodeError::PixelDataLength {
        expected,
        actual: data.len(),
    })
}
