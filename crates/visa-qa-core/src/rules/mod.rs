//! Compliance rules.
//!
//! Each rule implements [`ComplianceRule`] and judges one aspect of a photo
//! from a shared [`RuleContext`]. Rules never fail with an error: a missing
//! input produces a failing verdict with a reason.

mod file;
mod geometry;
mod metadata;
mod photometric;
mod strategy;

pub use file::{
    dimension_check, filename_check, format_check, size_check, DimensionsRule, FilenameRule,
    FormatRule, SizeRule, MAX_FILE_BYTES,
};
pub use geometry::{
    eye_slope_angle, jaw_vector_angle, EyeLevelRule, FaceCenteringRule, HeadHeightRule,
    HeadTiltRule, MAX_TILT_DEGREES,
};
pub use metadata::{
    age_check, edited_check, privacy_check, DateAgeRule, EditedRule, PrivacyRule, MAX_AGE_MONTHS,
};
pub use photometric::{BackgroundRule, ColorDepthRule, ContrastRule, ShadowRule};
pub use strategy::{ContrastStrategy, ParseStrategyError, ShadowStrategy, TiltStrategy, Variant};

use time::Date;

use crate::analysis::{LumaPlane, PixelFrame};
use crate::domain::{Detection, FileAttributes, MetadataMap, RuleId, Verdict};
use crate::geometry::GuideLines;

/// Failure reason used when a rule needs a face detection and there is none.
pub const NO_DETECTION: &str = "Auto-detect failed";

/// Everything a compliance run looks at, borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// File attributes of the upload.
    pub file: &'a FileAttributes,
    /// The 600×600 processing frame.
    pub frame: &'a PixelFrame,
    /// The decoded image at native resolution.
    pub native: &'a PixelFrame,
    /// Current guide lines.
    pub lines: &'a GuideLines,
    /// Face detection, if any.
    pub detection: Option<&'a Detection>,
    /// Embedded metadata, if any.
    pub metadata: Option<&'a MetadataMap>,
    /// Reference date for the capture-age rule.
    pub now: Date,
}

/// A snapshot plus quantities derived from it once per run.
#[derive(Debug)]
pub struct RuleContext<'a> {
    snapshot: Snapshot<'a>,
    luma: LumaPlane,
}

impl<'a> RuleContext<'a> {
    /// Derives the shared quantities for a snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot<'a>) -> Self {
        Self {
            luma: LumaPlane::from_frame(snapshot.frame),
            snapshot,
        }
    }

    /// The underlying snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot<'a> {
        &self.snapshot
    }

    /// Luminance of the processing frame.
    #[must_use]
    pub const fn luma(&self) -> &LumaPlane {
        &self.luma
    }

    /// The detection, or a failing verdict explaining its absence.
    ///
    /// # Errors
    ///
    /// Returns the failing verdict when no face was detected.
    pub fn require_detection(&self) -> Result<&'a Detection, Verdict> {
        self.snapshot
            .detection
            .ok_or_else(|| Verdict::fail(NO_DETECTION))
    }
}

/// A single compliance rule.
pub trait ComplianceRule: Send + Sync {
    /// Identifier of the verdict this rule produces.
    fn id(&self) -> RuleId;

    /// Judges the context. Must be deterministic and side-effect free.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict;
}
