//! Face and landmark detector port.

use crate::domain::{Detection, Upload};

/// Port for locating a face and its landmarks in an upload.
///
/// Coordinates in the returned detection are in the normalized 600×600 space.
pub trait FaceDetector: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Detects a single face.
    ///
    /// Returns `Ok(None)` when the photo contains no detectable face.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector itself is unavailable or misbehaves.
    fn detect(&self, upload: &Upload) -> anyhow::Result<Option<Detection>>;
}
