//! An uploaded photo: file attributes plus decoded pixel frames.

use std::path::PathBuf;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::PixelFrame;

/// Errors raised while turning raw bytes into an [`Upload`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// The bytes are not a decodable raster image.
    #[error("cannot decode {filename}: {source}")]
    Decode {
        /// Name of the offending file.
        filename: String,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
}

/// File-level facts, read once at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttributes {
    /// File name without directories.
    pub filename: String,
    /// Size of the file in bytes.
    pub byte_size: u64,
    /// MIME type sniffed from the content, e.g. `image/jpeg`.
    pub declared_type: Option<String>,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
}

/// A decoded upload, immutable for the rest of the session.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File attributes.
    pub attributes: FileAttributes,
    /// Where the file was read from, if it came from disk.
    pub source_path: Option<PathBuf>,
    bytes: Arc<[u8]>,
    frame: PixelFrame,
    native: PixelFrame,
}

impl Upload {
    /// Decodes an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Decode`] if the bytes are not a supported image.
    pub fn from_bytes(
        filename: impl Into<String>,
        bytes: Vec<u8>,
        source_path: Option<PathBuf>,
    ) -> Result<Self, UploadError> {
        let filename = filename.into();
        let declared_type = image::guess_format(&bytes)
            .ok()
            .map(|f| f.to_mime_type().to_string());
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(source) => return Err(UploadError::Decode { filename, source }),
        };
        let attributes = FileAttributes {
            filename,
            byte_size: bytes.len() as u64,
            declared_type,
            width: image.width(),
            height: image.height(),
        };
        let mut upload = Self::from_image(attributes, &image, bytes);
        upload.source_path = source_path;
        Ok(upload)
    }

    /// Builds an upload from an already decoded image and explicit attributes.
    ///
    /// The native frame is taken from `image`; `attributes` are trusted as given.
    #[must_use]
    pub fn from_image(attributes: FileAttributes, image: &DynamicImage, bytes: Vec<u8>) -> Self {
        let (w, h) = image.dimensions();
        tracing::debug!(
            filename = %attributes.filename,
            width = w,
            height = h,
            "normalizing upload to processing frame"
        );
        Self {
            attributes,
            source_path: None,
            bytes: bytes.into(),
            frame: PixelFrame::normalized(image),
            native: PixelFrame::native(image),
        }
    }

    /// Raw file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 600×600 processing frame.
    #[must_use]
    pub const fn frame(&self) -> &PixelFrame {
        &self.frame
    }

    /// The decoded image at native resolution.
    #[must_use]
    pub const fn native(&self) -> &PixelFrame {
        &self.native
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(image: &DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).expect("encode");
        out.into_inner()
    }

    #[test]
    fn test_from_bytes_png() {
        let bytes = encode(&DynamicImage::new_rgb8(64, 32), image::ImageFormat::Png);
        let len = bytes.len() as u64;
        let upload = Upload::from_bytes("a.png", bytes, None).unwrap();

        assert_eq!(upload.attributes.width, 64);
        assert_eq!(upload.attributes.height, 32);
        assert_eq!(upload.attributes.byte_size, len);
        assert_eq!(upload.attributes.declared_type.as_deref(), Some("image/png"));
        assert_eq!(upload.frame().width(), 600);
        assert_eq!(upload.native().width(), 64);
    }

    #[test]
    fn test_from_bytes_jpeg_type() {
        let bytes = encode(&DynamicImage::new_rgb8(16, 16), image::ImageFormat::Jpeg);
        let upload = Upload::from_bytes("a.jpg", bytes, None).unwrap();
        assert_eq!(upload.attributes.declared_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_from_bytes_garbage() {
        let err = Upload::from_bytes("x.jpg", b"not an image".to_vec(), None).unwrap_err();
        assert!(err.to_string().contains("x.jpg"));
    }
}
