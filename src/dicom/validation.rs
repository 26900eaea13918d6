use crate::dicom::error::DecodeError;
use crate::dicom::{PhotometricInterpretation, PixelDescriptor};

#[inline]
pub fn validate_bits_allocated(bits_allocated: u16) -> Result<(), DecodeError> {
    if !matches!(bits_allocated, 8 | 16) {
        return Err(DecodeError::UnsupportedBitDepth(bits_allocated));
    }

    Ok(())
}

#[inline]
pub fn validate_photometric_samples(
    photometric_interpretation: &PhotometricInterpretation,
    samples_per_pixel: u16,
) -> Result<(), DecodeError> {
    let Some(expected) = photometric_interpretation.expected_samples() else {
        return Err(DecodeError::UnsupportedPhotometricInterpretation(
            photometric_interpretation.to_string(),
        ));
    };

    if expected != samples_per_pixel {
        return Err(DecodeError::InconsistentPixelMetadata(format!(
            "photometric interpretation {photometric_interpretation} with samples per pixel {samples_per_pixel}"
        )));
    }

    Ok(())
}

#[inline]
pub fn validate_planar_configuration(planar_configuration: u16) -> Result<(), DecodeError> {
    if planar_configuration > 1 {
        return Err(DecodeError::InconsistentPixelMetadata(format!(
            "planar configuration {planar_configuration} (expected 0 or 1)"
        )));
    }

    Ok(())
}

/// Check that `descriptor` names a layout the decoder can render
pub fn validate_descriptor(descriptor: &PixelDescriptor) -> Result<(), DecodeError> {
    validate_bits_allocated(descriptor.bits_allocated())?;
    validate_photometric_samples(
        &descriptor.photometric_interpretation,
        descriptor.samples_per_pixel,
    )?;
    validate_planar_configuration(descriptor.planar_configuration)?;

    if !descriptor.bit_depth.is_valid() {
        return Err(DecodeError::InconsistentPixelMetadata(format!(
            "bits stored {} exceeds bits allocated {}",
            descriptor.bit_depth.stored,
            descriptor.bit_depth.allocated
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_bit_depths() {
        assert!(validate_bits_allocated(8).is_ok());
        assert!(validate_bits_allocated(16).is_ok());
        assert_matches!(validate_bits_allocated(12), Err(DecodeError::UnsupportedBitDepth(12)));
        assert_matches!(validate_bits_allocated(32), Err(DecodeError::UnsupportedBitDepth(32)));
    }

    #[test]
    fn test_photometric_samples() {
        assert!(validate_photometric_samples(&PhotometricInterpretation::Monochrome1, 1).is_ok());
        assert!(validate_photometric_samples(&PhotometricInterpretation::Rgb, 3).is_ok());
        assert_matches!(
            validate_photometric_samples(&PhotometricInterpretation::Rgb, 1),
            Err(DecodeError::InconsistentPixelMetadata(_))
        );
        assert_matches!(
            validate_photometric_samples(&PhotometricInterpretation::Other("YBR_FULL".into()), 3),
            Err(DecodeError::UnsupportedPhotometricInterpretation(name)) if name == "YBR_FULL"
        );
    }

    #[test]
    fn test_planar_configuration() {
        assert!(validate_planar_configuration(0).is_ok());
        assert!(validate_planar_configuration(1).is_ok());
        assert_matches!(
            validate_planar_configuration(2),
            Err(DecodeError::InconsistentPixelMetadata(_))
        );
    }
}
