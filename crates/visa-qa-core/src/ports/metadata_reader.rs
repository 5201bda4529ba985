//! Embedded metadata reader port.

use crate::domain::MetadataMap;

/// Port for extracting tag/value metadata from raw file bytes.
pub trait MetadataReader: Send + Sync {
    /// Extracts metadata.
    ///
    /// Returns `Ok(None)` when the file carries no metadata block.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata block is present but unreadable.
    fn extract(&self, bytes: &[u8]) -> anyhow::Result<Option<MetadataMap>>;
}
