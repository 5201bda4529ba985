//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod face_detector;
mod metadata_reader;
mod progress;
mod report_output;
mod upload_source;

pub use face_detector::FaceDetector;
pub use metadata_reader::MetadataReader;
pub use progress::{ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
pub use upload_source::UploadSource;
