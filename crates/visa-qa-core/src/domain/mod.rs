//! Core domain types for visa photo compliance.

mod detection;
mod metadata;
mod report;
mod upload;
mod verdict;

pub use detection::{Detection, FaceBox, Landmarks, Point};
pub use metadata::{tags, MetadataMap};
pub use report::{ComplianceReport, ImageDimensions, LineReport};
pub use upload::{FileAttributes, Upload, UploadError};
pub use verdict::{RuleId, Status, Verdict, VerdictSet};
