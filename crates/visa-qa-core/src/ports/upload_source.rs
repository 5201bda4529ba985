//! Upload source port for loading photos to check.

use crate::domain::Upload;

/// Port for loading uploads from a source.
pub trait UploadSource: Send + Sync {
    /// Returns an iterator over uploads from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a photo fails to load.
    fn uploads(&self) -> Box<dyn Iterator<Item = anyhow::Result<Upload>> + Send + '_>;

    /// Returns the total number of uploads, if known.
    fn count_hint(&self) -> Option<usize>;
}
