//! Visa QA Adapters - External adapters for visa-qa.
//!
//! This crate provides adapters for:
//! - Filesystem upload source
//! - EXIF metadata extraction
//! - Landmark sidecar and external command face detectors

pub mod detector;
pub mod fs;
pub mod metadata;

pub use detector::{CommandDetector, SidecarDetector, SIDECAR_SUFFIX};
pub use fs::{load_upload, FsUploadSource};
pub use metadata::ExifMetadataReader;
