//! Pixel-related attributes derived from a dataset

use crate::dicom::error::DecodeError;
use crate::dicom::{Dataset, PhotometricInterpretation, Tag, dictionary, tags};
use crate::types::{BitDepth, Dimensions, SOPClass};
use std::str::FromStr;

/// Partial metadata for error message context
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub modality: Option<String>,
    pub sop_class: Option<SOPClass>,
}

impl ErrorContext {
    pub fn format_error(&self, tag_name: &str) -> String {
        let mut parts = Vec::new();

        if let Some(modality) = &self.modality {
            parts.push(format!("Modality: {modality}"));
        }

        if let Some(sc) = &self.sop_class {
            parts.push(format!("SOP Class: {sc}"));
        }

        if parts.is_empty() {
            format!("Missing or invalid {tag_name} tag")
        } else {
            format!(
                "Missing or invalid {tag_name} tag - this may be a non-image DICOM file ({})",
                parts.join(", ")
            )
        }
    }
}

impl From<&Dataset> for ErrorContext {
    fn from(dataset: &Dataset) -> Self {
        ErrorContext {
            modality: dataset.string(tags::MODALITY).map(str::to_string),
            sop_class: extract_sop_class(dataset),
        }
    }
}

pub fn extract_sop_class(dataset: &Dataset) -> Option<SOPClass> {
    dataset.string(tags::SOP_CLASS_UID).and_then(|uid| {
        dictionary::sop_class_name(uid).map(|name| SOPClass::new(uid.to_string(), name.to_string()))
    })
}

/// View over the attributes that describe the pixel data layout.
///
/// Computed on demand, never stored. Rows, Columns, Bits Allocated,
/// Samples per Pixel and Photometric Interpretation are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelDescriptor {
    pub dimensions: Dimensions,
    pub bit_depth: BitDepth,
    pub samples_per_pixel: u16,
    pub photometric_interpretation: PhotometricInterpretation,
    /// 0 = interleaved (R1G1B1R2...), 1 = planar (R1R2...G1G2...B1B2...)
    pub planar_configuration: u16,
    /// Pixel Representation 1 (two's complement samples)
    pub signed: bool,
    pub number_of_frames: u32,
}

impl PixelDescriptor {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, DecodeError> {
        let context = ErrorContext::from(dataset);

        let rows = required_u16(dataset, tags::ROWS, "Rows", &context)?;
        let cols = required_u16(dataset, tags::COLUMNS, "Columns", &context)?;
        let allocated = required_u16(dataset, tags::BITS_ALLOCATED, "Bits Allocated", &context)?;
        let samples_per_pixel = required_u16(
            dataset,
            tags::SAMPLES_PER_PIXEL,
            "Samples per Pixel",
            &context,
        )?;

        let photometric_interpretation = dataset
            .string(tags::PHOTOMETRIC_INTERPRETATION)
            .map(|s| match PhotometricInterpretation::from_str(s) {
                Ok(pi) => pi,
                Err(never) => match never {},
            })
            .ok_or_else(|| {
                let message = context.format_error("Photometric Interpretation");
                DecodeError::MissingPixelMetadata(message)
            })?;

        // Optional attributes: Bits Stored defaults to Bits Allocated
        let stored = optional_u16(dataset, tags::BITS_STORED).unwrap_or(allocated);
        let planar_configuration = optional_u16(dataset, tags::PLANAR_CONFIGURATION).unwrap_or(0);
        let signed = optional_u16(dataset, tags::PIXEL_REPRESENTATION) == Some(1);
        let number_of_frames = dataset.uint(tags::NUMBER_OF_FRAMES).unwrap_or(1).max(1);

        Ok(Self {
            dimensions: Dimensions::new(rows, cols),
            bit_depth: BitDepth::new(allocated, stored),
            samples_per_pixel,
            photometric_interpretation,
            planar_configuration,
            signed,
            number_of_frames,
        })
    }

    #[inline(always)]
    #[must_use]
    pub fn rows(&self) -> u16 {
        self.dimensions.rows
    }

    #[inline(always)]
    #[must_use]
    pub fn cols(&self) -> u16 {
        self.dimensions.cols
    }

    #[inline(always)]
    #[must_use]
    pub fn bits_allocated(&self) -> u16 {
        self.bit_depth.allocated
    }

    /// Byte size of one frame of native pixel data
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.dimensions.pixel_count()
            * usize::from(self.samples_per_pixel)
            * self.bit_depth.bytes_per_sample()
    }
}

fn optional_u16(dataset: &Dataset, tag: Tag) -> Option<u16> {
    dataset.uint(tag).and_then(|v| u16::try_from(v).ok())
}

fn required_u16(
    dataset: &Dataset,
    tag: Tag,
    name: &str,
    context: &ErrorContext,
) -> Result<u16, DecodeError> {
    optional_u16(dataset, tag)
        .filter(|&v| v > 0)
        .ok_or_else(|| DecodeError::MissingPixelMetadata(context.format_error(name)))
}
