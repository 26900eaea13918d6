pub mod cli;
pub mod dicom;
pub mod display_metadata;
pub mod fingerprint;
pub mod image;
pub mod ingest;
pub mod registry;
pub mod store;
pub mod types;

// Re-export the library entry points
pub use crate::image::render_to_raster;
pub use dicom::{get_tag_value, parse_dataset};
pub use display_metadata::print_report;
pub use fingerprint::compute_fingerprint;
pub use registry::register_if_new;
