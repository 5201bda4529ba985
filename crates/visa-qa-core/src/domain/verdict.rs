//! Verdict types produced by a compliance run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a single compliance rule.
///
/// Declaration order is the display order of the verdict set.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    /// Native pixel dimensions are exactly 600×600.
    Dimensions,
    /// File size at most 240 KiB.
    Size,
    /// JPEG format.
    Format,
    /// Filename restricted to letters, digits, `_`, `.` and `-`.
    Filename,
    /// No GPS or orientation tags.
    MetadataPrivacy,
    /// Capture date no more than six months old.
    DateAge,
    /// 24-bit color, no transparency.
    ColorDepth,
    /// Chin-to-top distance as a share of the frame.
    HeadHeight,
    /// Eye line height from the bottom of the frame.
    EyeLevel,
    /// Face horizontally centered.
    FaceCentering,
    /// Head not tilted.
    HeadTilt,
    /// Enough tonal contrast.
    Contrast,
    /// No strong shadows.
    Shadow,
    /// Light, uniform background at the corners.
    BackgroundUniformity,
    /// No editing software signature.
    Edited,
}

impl RuleId {
    /// Every rule, in display order.
    pub const ALL: [Self; 15] = [
        Self::Dimensions,
        Self::Size,
        Self::Format,
        Self::Filename,
        Self::MetadataPrivacy,
        Self::DateAge,
        Self::ColorDepth,
        Self::HeadHeight,
        Self::EyeLevel,
        Self::FaceCentering,
        Self::HeadTilt,
        Self::Contrast,
        Self::Shadow,
        Self::BackgroundUniformity,
        Self::Edited,
    ];

    /// Stable identifier used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dimensions => "dimensions",
            Self::Size => "size",
            Self::Format => "format",
            Self::Filename => "filename",
            Self::MetadataPrivacy => "metadata-privacy",
            Self::DateAge => "date-age",
            Self::ColorDepth => "color-depth",
            Self::HeadHeight => "head-height",
            Self::EyeLevel => "eye-level",
            Self::FaceCentering => "face-centering",
            Self::HeadTilt => "head-tilt",
            Self::Contrast => "contrast",
            Self::Shadow => "shadow",
            Self::BackgroundUniformity => "background-uniformity",
            Self::Edited => "edited",
        }
    }

    /// Human-readable rule description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dimensions => "Dimensions must be 600×600 px",
            Self::Size => "File size ≤ 240 KB",
            Self::Format => "Format: JPG only",
            Self::Filename => "Filename valid (letters/numbers/_ . -)",
            Self::MetadataPrivacy => "No GPS/Orientation metadata",
            Self::DateAge => "Photo date ≤ 6 months old",
            Self::ColorDepth => "Color depth 24-bit",
            Self::HeadHeight => "Head height (chin→top) 50%–69%",
            Self::EyeLevel => "Eye level 56%–69%",
            Self::FaceCentering => "Face centered ±5%",
            Self::HeadTilt => "Head tilt ≤ 5°",
            Self::Contrast => "Contrast ok",
            Self::Shadow => "No strong shadows",
            Self::BackgroundUniformity => "Background uniform & light",
            Self::Edited => "No software editing detected",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not evaluated yet.
    #[default]
    Pending,
    /// Rule satisfied.
    Pass,
    /// Rule violated or not verifiable.
    Fail,
}

/// Status plus a human-readable detail for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome.
    pub status: Status,
    /// Measured value or failure reason. May be empty.
    pub detail: String,
}

impl Verdict {
    /// A pending verdict with no detail.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: Status::Pending,
            detail: String::new(),
        }
    }

    /// A passing verdict.
    #[must_use]
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Pass,
            detail: detail.into(),
        }
    }

    /// A failing verdict.
    #[must_use]
    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            detail: detail.into(),
        }
    }

    /// Pass or fail depending on `ok`, with the same detail either way.
    #[must_use]
    pub fn from_bool(ok: bool, detail: impl Into<String>) -> Self {
        if ok {
            Self::pass(detail)
        } else {
            Self::fail(detail)
        }
    }

    /// Returns true if the rule passed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }

    /// Returns true if the rule failed.
    #[must_use]
    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }
}

/// One verdict per rule, keyed and ordered by [`RuleId`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerdictSet {
    verdicts: BTreeMap<RuleId, Verdict>,
}

impl VerdictSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verdicts: BTreeMap::new(),
        }
    }

    /// Creates a set with every given rule pending.
    #[must_use]
    pub fn pending(rules: &[RuleId]) -> Self {
        Self {
            verdicts: rules.iter().map(|&id| (id, Verdict::pending())).collect(),
        }
    }

    /// Records the verdict for a rule, replacing any previous one.
    pub fn insert(&mut self, rule: RuleId, verdict: Verdict) {
        self.verdicts.insert(rule, verdict);
    }

    /// Looks up the verdict of a rule.
    #[must_use]
    pub fn get(&self, rule: RuleId) -> Option<&Verdict> {
        self.verdicts.get(&rule)
    }

    /// Status of a rule, if present.
    #[must_use]
    pub fn status(&self, rule: RuleId) -> Option<Status> {
        self.get(rule).map(|v| v.status)
    }

    /// Iterates over verdicts in rule order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Verdict)> {
        self.verdicts.iter().map(|(&id, v)| (id, v))
    }

    /// Number of rules in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Returns true if the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Rules that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<RuleId> {
        self.iter()
            .filter(|(_, v)| v.is_fail())
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns true if every rule in the set passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.is_empty() && self.verdicts.values().all(Verdict::is_pass)
    }
}
