//! Guide-line model: top-of-head, chin and eye-level markers.
//!
//! All positions are Y offsets in the normalized 600×600 frame, measured from
//! the top edge. Percentages shown to the user are measured from the bottom,
//! `(1 - y / 600) × 100`, so a larger percentage is higher on the image.

use serde::{Deserialize, Serialize};

use crate::domain::Detection;

/// Side of the normalized processing square.
pub const FRAME_SIZE: f64 = 600.0;

/// [`FRAME_SIZE`] as a pixel count.
pub const FRAME_SIZE_PX: u32 = 600;

/// Lines never get closer than this to the frame edges.
pub const EDGE_MARGIN: f64 = 6.0;

/// Minimum distance between the top-of-head and chin lines.
pub const MIN_SEPARATION: f64 = 8.0;

/// A pointer grabs a line within this distance.
pub const HIT_RADIUS: f64 = 20.0;

/// Default top-of-head line.
pub const DEFAULT_HEAD_TOP: f64 = 140.0;

/// Default chin line.
pub const DEFAULT_CHIN: f64 = 460.0;

/// Default eye line.
pub const DEFAULT_EYE: f64 = 300.0;

/// One of the three guide lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineId {
    /// Top of the head.
    HeadTop,
    /// Bottom of the chin.
    Chin,
    /// Eye level.
    Eye,
}

impl LineId {
    /// Short label prefix used on screen.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::HeadTop => "top",
            Self::Chin => "chin",
            Self::Eye => "eyes",
        }
    }
}

/// The three guide-line positions.
///
/// Invariant: `head_top + 8 <= chin`, and all three lie in `[6, 594]` once
/// moved by [`GuideLines::drag`] or seeded from a detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLines {
    head_top: f64,
    chin: f64,
    eye: f64,
}

impl Default for GuideLines {
    fn default() -> Self {
        Self {
            head_top: DEFAULT_HEAD_TOP,
            chin: DEFAULT_CHIN,
            eye: DEFAULT_EYE,
        }
    }
}

impl GuideLines {
    /// Lines at their default positions `(140, 460, 300)`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines derived from a detection, or defaults when there is none.
    #[must_use]
    pub fn seeded(detection: Option<&Detection>) -> Self {
        let mut lines = Self::new();
        lines.seed_from_detection(detection);
        lines
    }

    /// Restores the default positions.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overwrites all three lines from detector output.
    ///
    /// - top: box top minus `max(8, 6% of box height)`
    /// - chin: middle point of the jaw outline, or the box bottom without one
    /// - eye: mean of the two eye-group centroids, or whichever one exists
    ///
    /// Each value is clamped to `[6, 594]`, then the top/chin separation is restored.
    pub fn seed_from_detection(&mut self, detection: Option<&Detection>) {
        let Some(det) = detection else {
            self.reset();
            return;
        };

        let margin = MIN_SEPARATION.max(det.bbox.height * 0.06);
        let head_top = finite_or(det.bbox.y - margin, DEFAULT_HEAD_TOP);
        let chin = finite_or(
            det.chin_point().map_or_else(|| det.bbox.bottom(), |p| p.y),
            DEFAULT_CHIN,
        );
        let eye = finite_or(eye_line(det).unwrap_or(DEFAULT_EYE), DEFAULT_EYE);

        let mut head_top = clamp(head_top, EDGE_MARGIN, FRAME_SIZE - EDGE_MARGIN);
        let mut chin = clamp(chin, EDGE_MARGIN, FRAME_SIZE - EDGE_MARGIN);
        if chin < head_top + MIN_SEPARATION {
            chin = (head_top + MIN_SEPARATION).min(FRAME_SIZE - EDGE_MARGIN);
            head_top = head_top.min(chin - MIN_SEPARATION);
        }

        *self = Self {
            head_top,
            chin,
            eye: clamp(eye, EDGE_MARGIN, FRAME_SIZE - EDGE_MARGIN),
        };
    }

    /// Line nearest to `y` within [`HIT_RADIUS`], ties going to top, then chin, then eye.
    #[must_use]
    pub fn hit_test(&self, y: f64) -> Option<LineId> {
        let candidates = [
            (LineId::HeadTop, (y - self.head_top).abs()),
            (LineId::Chin, (y - self.chin).abs()),
            (LineId::Eye, (y - self.eye).abs()),
        ];
        let mut best: Option<(LineId, f64)> = None;
        for (id, dist) in candidates {
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((id, dist));
            }
        }
        best.filter(|&(_, d)| d <= HIT_RADIUS).map(|(id, _)| id)
    }

    /// Moves one line, clamping so the ordering invariant always holds.
    ///
    /// Non-finite positions are ignored.
    pub fn drag(&mut self, line: LineId, y: f64) {
        if !y.is_finite() {
            return;
        }
        match line {
            LineId::HeadTop => {
                self.head_top = clamp(y, EDGE_MARGIN, self.chin - MIN_SEPARATION);
            }
            LineId::Chin => {
                self.chin = clamp(y, self.head_top + MIN_SEPARATION, FRAME_SIZE - EDGE_MARGIN);
            }
            LineId::Eye => {
                self.eye = clamp(y, EDGE_MARGIN, FRAME_SIZE - EDGE_MARGIN);
            }
        }
    }

    /// Top-of-head position.
    #[must_use]
    pub const fn head_top(&self) -> f64 {
        self.head_top
    }

    /// Chin position.
    #[must_use]
    pub const fn chin(&self) -> f64 {
        self.chin
    }

    /// Eye-level position.
    #[must_use]
    pub const fn eye(&self) -> f64 {
        self.eye
    }

    /// Position of the given line.
    #[must_use]
    pub const fn get(&self, line: LineId) -> f64 {
        match line {
            LineId::HeadTop => self.head_top,
            LineId::Chin => self.chin,
            LineId::Eye => self.eye,
        }
    }

    /// Chin-to-top distance as a percentage of the frame.
    #[must_use]
    pub fn head_height_percent(&self) -> f64 {
        (self.chin - self.head_top) / FRAME_SIZE * 100.0
    }

    /// Eye line height measured from the bottom of the frame, in percent.
    #[must_use]
    pub fn eye_level_percent(&self) -> f64 {
        percent_from_bottom(self.eye)
    }

    /// Live on-screen label for a line, e.g. `"top 76.7%"`.
    #[must_use]
    pub fn label(&self, line: LineId) -> String {
        format!(
            "{} {}",
            line.short_name(),
            fmt_percent(percent_from_bottom(self.get(line)))
        )
    }
}

/// `(1 - y / 600) × 100`.
#[must_use]
pub fn percent_from_bottom(y: f64) -> f64 {
    (1.0 - y / FRAME_SIZE) * 100.0
}

/// Rounds to one decimal and appends `%`: `76.666…` becomes `"76.7%"`.
#[must_use]
pub fn fmt_percent(value: f64) -> String {
    format!("{:.1}%", (value * 10.0).round() / 10.0)
}

/// Maps a client-space Y coordinate on a rendered surface into normalized space.
///
/// The surface spans `surface_height` client units starting at `surface_top`.
/// The result is clamped to `[0, 600]`; a degenerate surface maps to 0.
#[must_use]
pub fn client_to_normalized(client_y: f64, surface_top: f64, surface_height: f64) -> f64 {
    if !(surface_height.is_finite() && surface_height > 0.0) || !client_y.is_finite() {
        return 0.0;
    }
    let scale = FRAME_SIZE / surface_height;
    clamp((client_y - surface_top) * scale, 0.0, FRAME_SIZE)
}

fn eye_line(det: &Detection) -> Option<f64> {
    match det.eye_centers() {
        (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
        (Some(p), None) | (None, Some(p)) => Some(p.y),
        (None, None) => None,
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// `max(lo, min(hi, v))`.
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}
