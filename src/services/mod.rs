//! Service layer for pc2monarch
//!
//! Format detection, row transformation and the file conversion pipeline.

pub mod convert;
pub mod detect;
pub mod transform;

pub use convert::{write_monarch_csv, Conversion, ConvertService};
pub use detect::{detect_format, detect_from_record, DetectedFormat};
pub use transform::transform;
