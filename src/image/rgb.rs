use super::normalization::{samples_to_u8, unpack_samples};
use super::RasterImage;
use crate::dicom::{DecodeError, PixelDescriptor};

/// Convert one frame of RGB samples to an interleaved 8-bit raster
///
/// # Errors
///
/// Returns an error if the frame does not hold `rows * cols * 3` samples
pub fn convert_rgb(descriptor: &PixelDescriptor, frame: &[u8]) -> Result<RasterImage, DecodeError> {
    let pixel_count = descriptor.dimensions.pixel_count();
    let samples = unpack_samples(frame, descriptor);

    let samples = match descriptor.planar_configuration {
        1 => interleave_planes(&samples, pixel_count),
        _ => samples,
    };

    // One stretch over all channels keeps their relative balance
    let rgb = samples_to_u8(&samples, descriptor);

    let (width, height) = (u32::from(descriptor.cols()), u32::from(descriptor.rows()));
    RasterImage::from_raw(width, height, 3, rgb).ok_or_else(|| {
        DecodeError::InconsistentPixelMetadata(format!(
            "RGB frame does not match {}",
            descriptor.dimensions
        ))
    })
}

/// R1R2..G1G2..B1B2.. to R1G1B1R2G2B2..
fn interleave_planes<T: Copy>(planar: &[T], pixel_count: usize) -> Vec<T> {
    let (r, rest) = planar.split_at(pixel_count.min(planar.len()));
    let (g, b) = rest.split_at(pixel_count.min(rest.len()));

    r.iter()
        .zip(g)
        .zip(b)
        .flat_map(|((&r, &g), &b)| [r, g, b])
        .collect()
}
