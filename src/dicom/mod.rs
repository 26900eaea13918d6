//! DICOM file parsing and tag extraction
//!
//! This module turns raw Part 10 bytes into an in-memory [`Dataset`] and
//! derives the pixel description needed for rendering.

mod dataset;
pub mod dictionary;
mod element;
mod error;
mod parser;
mod photometric;
mod pixel_descriptor;
pub mod reader;
pub mod tags;
mod transfer_syntax;
mod validation;
pub mod writer;

// Re-export public API
pub use dataset::{Dataset, get_tag_value};
pub use element::{Element, Length, ParseTagError, Tag, VR, Value};
pub use error::{DecodeError, EncodeError, FormatError, TagNotFound};
pub use parser::{DicomFile, MAX_SEQUENCE_DEPTH, parse_dataset};
pub use photometric::PhotometricInterpretation;
pub use pixel_descriptor::{ErrorContext, PixelDescriptor};
pub use transfer_syntax::TransferSyntax;
pub use validation::validate_descriptor;
