//! Filesystem adapter for loading uploads.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use visa_qa_core::{Upload, UploadSource};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Filesystem upload source adapter.
///
/// The file list is resolved once, when the source is built.
pub struct FsUploadSource {
    files: Vec<PathBuf>,
}

impl FsUploadSource {
    /// Creates a new filesystem upload source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        let files = collect_files(&paths, recursive);
        debug!("Found {} image files", files.len());
        Self { files }
    }

    /// Files this source will yield, in order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Resolves paths into a list of files.
///
/// Files named explicitly are always kept, whatever their extension; decoding
/// decides whether they are images. Directory contents are filtered by
/// extension and sorted so batches are reproducible.
fn collect_files(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_from_dir(path, recursive, &mut found);
            found.sort();
            files.extend(found);
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    files
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            files.push(path);
        } else if path.is_dir() && recursive {
            collect_from_dir(&path, recursive, files);
        }
    }
}

impl UploadSource for FsUploadSource {
    fn uploads(&self) -> Box<dyn Iterator<Item = Result<Upload>> + Send + '_> {
        Box::new(self.files.iter().map(|path| load_upload(path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.files.len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Reads and decodes a file from the filesystem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_upload(path: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Upload::from_bytes(filename, bytes, Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open image: {}", path.display()))
}
