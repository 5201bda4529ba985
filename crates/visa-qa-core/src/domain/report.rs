//! Per-photo compliance report.

use serde::{Deserialize, Serialize};

use super::{MetadataMap, VerdictSet};
use crate::geometry::{GuideLines, LineId};

/// Complete result of checking a single photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Path to the checked photo.
    pub path: String,
    /// Timestamp of the check (RFC 3339).
    pub timestamp: String,
    /// Native image dimensions.
    pub dimensions: ImageDimensions,
    /// Whether a face detection was available.
    pub detected_face: bool,
    /// Guide-line positions used for the geometric rules.
    pub lines: LineReport,
    /// One verdict per evaluated rule.
    pub verdicts: VerdictSet,
    /// Embedded metadata, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataMap>,
}

impl ComplianceReport {
    /// Returns true if every rule passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdicts.all_passed()
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Guide-line positions with their on-screen labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReport {
    /// Top-of-head Y offset.
    pub head_top: f64,
    /// Chin Y offset.
    pub chin: f64,
    /// Eye-level Y offset.
    pub eye: f64,
    /// Label of the top-of-head line.
    pub head_top_label: String,
    /// Label of the chin line.
    pub chin_label: String,
    /// Label of the eye line.
    pub eye_label: String,
}

impl From<&GuideLines> for LineReport {
    fn from(lines: &GuideLines) -> Self {
        Self {
            head_top: lines.head_top(),
            chin: lines.chin(),
            eye: lines.eye(),
            head_top_label: lines.label(LineId::HeadTop),
            chin_label: lines.label(LineId::Chin),
            eye_label: lines.label(LineId::Eye),
        }
    }
}
