//! Test support utilities for visa-qa.
//!
//! Provides mocks, synthetic image and detection builders, and encoders for
//! writing test photos to disk.
//!
//! # Example
//!
//! ```
//! use visa_qa_test_support::{DetectionBuilder, MockFaceDetector, UploadBuilder};
//!
//! let upload = UploadBuilder::portrait().build();
//! let detector = MockFaceDetector::returning(DetectionBuilder::centered().build());
//! # let _ = (upload, detector);
//! ```

mod builders;
mod mocks;

pub use builders::{
    encode_jpeg, encode_png, DetectionBuilder, ExifBuilder, SyntheticFrameBuilder, UploadBuilder,
    PORTRAIT_BACKGROUND,
};
pub use mocks::{
    Behavior, MockFaceDetector, MockMetadataReader, MockProgressSink, MockReportOutput,
    MockUploadSource,
};
