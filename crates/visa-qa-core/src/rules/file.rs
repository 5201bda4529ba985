//! File attribute rules: dimensions, size, format and filename.

use super::{ComplianceRule, RuleContext};
use crate::domain::{RuleId, Verdict};
use crate::geometry::FRAME_SIZE_PX;

/// Largest accepted file, in bytes (240 KiB).
pub const MAX_FILE_BYTES: u64 = 240 * 1024;

/// Passes iff both native dimensions are 600. Detail: `"{w}×{h}"`.
#[must_use]
pub fn dimension_check(width: u32, height: u32) -> Verdict {
    Verdict::from_bool(
        width == FRAME_SIZE_PX && height == FRAME_SIZE_PX,
        format!("{width}×{height}"),
    )
}

/// Passes iff the file is at most [`MAX_FILE_BYTES`]. Detail: rounded KiB.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn size_check(bytes: u64) -> Verdict {
    let kib = (bytes as f64 / 1024.0).round();
    Verdict::from_bool(bytes <= MAX_FILE_BYTES, format!("{kib} KB"))
}

/// Passes iff the content type is JPEG or the name has a JPEG extension.
#[must_use]
pub fn format_check(declared_type: Option<&str>, filename: &str) -> Verdict {
    let lower = filename.to_ascii_lowercase();
    let is_jpeg = declared_type == Some("image/jpeg")
        || lower.ends_with(".jpg")
        || lower.ends_with(".jpeg");
    if is_jpeg {
        Verdict::pass("JPG")
    } else {
        Verdict::fail("Not JPG")
    }
}

/// Passes iff the name is non-empty and only uses `[a-zA-Z0-9_.-]`.
#[must_use]
pub fn filename_check(filename: &str) -> Verdict {
    let valid = !filename.is_empty()
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    Verdict::from_bool(valid, filename)
}

/// Native pixel dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionsRule;

impl ComplianceRule for DimensionsRule {
    fn id(&self) -> RuleId {
        RuleId::Dimensions
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let file = ctx.snapshot().file;
        dimension_check(file.width, file.height)
    }
}

/// File size limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeRule;

impl ComplianceRule for SizeRule {
    fn id(&self) -> RuleId {
        RuleId::Size
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        size_check(ctx.snapshot().file.byte_size)
    }
}

/// JPEG only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRule;

impl ComplianceRule for FormatRule {
    fn id(&self) -> RuleId {
        RuleId::Format
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let file = ctx.snapshot().file;
        format_check(file.declared_type.as_deref(), &file.filename)
    }
}

/// Filename character set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameRule;

impl ComplianceRule for FilenameRule {
    fn id(&self) -> RuleId {
        RuleId::Filename
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        filename_check(&ctx.snapshot().file.filename)
    }
}
