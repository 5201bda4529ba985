//! EXIF metadata reader backed by `kamadak-exif`.

use std::io::Cursor;

use anyhow::{Context, Result};
use tracing::debug;
use visa_qa_core::{MetadataMap, MetadataReader};

/// Reads EXIF tags from JPEG, TIFF, PNG, WebP and HEIF containers.
///
/// Only the primary image is read; thumbnail tags are ignored. ASCII values are
/// kept verbatim so timestamps stay in their `YYYY:MM:DD HH:MM:SS` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadataReader;

impl ExifMetadataReader {
    /// Creates a new reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetadataReader for ExifMetadataReader {
    fn extract(&self, bytes: &[u8]) -> Result<Option<MetadataMap>> {
        let mut cursor = Cursor::new(bytes);
        let exif = match exif::Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                debug!("No EXIF block");
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to parse EXIF"),
        };

        let mut map = MetadataMap::new();
        for field in exif.fields() {
            if field.ifd_num != exif::In::PRIMARY {
                continue;
            }
            let value = match &field.value {
                exif::Value::Ascii(parts) => parts
                    .iter()
                    .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => field.display_value().with_unit(&exif).to_string(),
            };
            map.insert(field.tag.to_string(), value);
        }

        debug!(tags = map.len(), "Read EXIF block");
        if map.is_empty() {
            Ok(None)
        } else {
            Ok(Some(map))
        }
    }
}
