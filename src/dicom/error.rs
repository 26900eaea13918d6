use crate::dicom::{Tag, VR};
use thiserror::Error;

/// Reasons an upload is rejected while parsing.
///
/// Every variant is terminal for the file: the parser never hands back a
/// partially populated dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Preamble too short or "DICM" magic missing at offset 128
    #[error("not a DICOM file: missing DICM magic at offset 128")]
    NotADicomFile,

    #[error("file meta group has no Transfer Syntax UID (0002,0010)")]
    MissingTransferSyntax,

    #[error("unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),

    #[error("truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("duplicate tag {0} within one dataset")]
    DuplicateTag(Tag),

    #[error("malformed sequence: {0}")]
    MalformedSequence(String),

    /// Numeric value whose byte length is not a multiple of the VR width
    #[error("invalid value length {length} for {tag} with VR {vr}")]
    InvalidValueLength { tag: Tag, vr: VR, length: u32 },
}

/// Reasons a parsed dataset cannot be turned into a raster image.
///
/// These only fail the conversion; tag extraction and duplicate detection on
/// the same file are unaffected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    MissingPixelMetadata(String),

    #[error("dataset does not contain pixel data")]
    NoPixelData,

    #[error("unsupported bits allocated: {0} (expected 8 or 16)")]
    UnsupportedBitDepth(u16),

    #[error("unsupported photometric interpretation: {0}")]
    UnsupportedPhotometricInterpretation(String),

    #[error("inconsistent pixel metadata: {0}")]
    InconsistentPixelMetadata(String),

    #[error("invalid pixel data size: expected at least {expected} bytes for the first frame, got {actual}")]
    PixelDataLength { expected: usize, actual: usize },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Failures of the PNG encoder.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unsupported channel count: {0} (expected 1 or 3)")]
    UnsupportedChannelCount(u16),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Per-query result of a tag lookup; not an error for the dataset itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tag {0} not found")]
pub struct TagNotFound(pub Tag);
