//! Geometric rules driven by the guide lines and the face detection.

use super::{ComplianceRule, RuleContext, TiltStrategy};
use crate::domain::{Detection, Point, RuleId, Verdict};
use crate::geometry::{fmt_percent, FRAME_SIZE};

/// Largest accepted head tilt, in degrees, inclusive.
pub const MAX_TILT_DEGREES: f64 = 5.0;

/// Accepted head height band, percent of the frame.
const HEAD_HEIGHT_RANGE: (f64, f64) = (50.0, 69.0);

/// Accepted eye level band, percent from the bottom.
const EYE_LEVEL_RANGE: (f64, f64) = (56.0, 69.0);

/// Largest accepted horizontal deviation of the face center, percent of the frame.
const MAX_CENTER_DEVIATION: f64 = 5.0;

/// Replaces a zero horizontal run when computing a slope.
const SLOPE_EPSILON: f64 = 0.0001;

/// Angle of the line through the two eye-group centroids, in `(-90°, 90°)`.
///
/// `None` if either eye group is empty.
#[must_use]
pub fn eye_slope_angle(detection: &Detection) -> Option<f64> {
    match detection.eye_centers() {
        (Some(left), Some(right)) => Some(slope_angle(left, right)),
        _ => None,
    }
}

/// Angle of the vector from the first to the last jaw point, in `(-90°, 90°)`.
///
/// `None` with fewer than two jaw points.
#[must_use]
pub fn jaw_vector_angle(detection: &Detection) -> Option<f64> {
    match detection.landmarks.jaw_outline.as_slice() {
        [first, .., last] => Some(slope_angle(*first, *last)),
        _ => None,
    }
}

fn slope_angle(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dx = if dx.abs() > 0.0 { dx } else { SLOPE_EPSILON };
    ((to.y - from.y) / dx).atan().to_degrees()
}

fn within((lo, hi): (f64, f64), value: f64) -> bool {
    (lo..=hi).contains(&value)
}

/// Chin-to-top distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadHeightRule {
    /// Fail outright when no face was detected.
    pub require_face: bool,
}

impl ComplianceRule for HeadHeightRule {
    fn id(&self) -> RuleId {
        RuleId::HeadHeight
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        if self.require_face {
            if let Err(verdict) = ctx.require_detection() {
                return verdict;
            }
        }
        let pct = ctx.snapshot().lines.head_height_percent();
        Verdict::from_bool(within(HEAD_HEIGHT_RANGE, pct), fmt_percent(pct))
    }
}

/// Eye line height.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyeLevelRule {
    /// Fail outright when no face was detected.
    pub require_face: bool,
}

impl ComplianceRule for EyeLevelRule {
    fn id(&self) -> RuleId {
        RuleId::EyeLevel
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        if self.require_face {
            if let Err(verdict) = ctx.require_detection() {
                return verdict;
            }
        }
        let pct = ctx.snapshot().lines.eye_level_percent();
        Verdict::from_bool(within(EYE_LEVEL_RANGE, pct), fmt_percent(pct))
    }
}

/// Horizontal face position.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceCenteringRule;

impl ComplianceRule for FaceCenteringRule {
    fn id(&self) -> RuleId {
        RuleId::FaceCentering
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let det = match ctx.require_detection() {
            Ok(det) => det,
            Err(verdict) => return verdict,
        };
        let deviation = (det.bbox.center_x() - FRAME_SIZE / 2.0).abs() / FRAME_SIZE * 100.0;
        Verdict::from_bool(deviation <= MAX_CENTER_DEVIATION, fmt_percent(deviation))
    }
}

/// Head roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadTiltRule {
    /// Which landmarks define the tilt.
    pub strategy: TiltStrategy,
}

impl ComplianceRule for HeadTiltRule {
    fn id(&self) -> RuleId {
        RuleId::HeadTilt
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let det = match ctx.require_detection() {
            Ok(det) => det,
            Err(verdict) => return verdict,
        };
        let angle = match self.strategy {
            TiltStrategy::EyeSlope => eye_slope_angle(det),
            TiltStrategy::JawVector => jaw_vector_angle(det),
        };
        let Some(angle) = angle else {
            return Verdict::fail("Landmarks incomplete");
        };
        let abs = angle.abs();
        Verdict::from_bool(abs <= MAX_TILT_DEGREES, format!("{abs:.1}°"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{FaceBox, Landmarks};
    use crate::geometry::LineId;
    use crate::rules::fixtures::Owned;
    use crate::rules::NO_DETECTION;

    fn face(center_x: f64, left: Point, right: Point, jaw: Vec<Point>) -> Detection {
        Detection {
            bbox: FaceBox {
                x: center_x - 100.0,
                y: 150.0,
                width: 200.0,
                height: 260.0,
            },
            landmarks: Landmarks {
                left_eye: vec![left],
                right_eye: vec![right],
                jaw_outline: jaw,
            },
        }
    }

    fn level_face(center_x: f64) -> Detection {
        face(
            center_x,
            Point::new(center_x - 50.0, 240.0),
            Point::new(center_x + 50.0, 240.0),
            vec![
                Point::new(center_x - 100.0, 300.0),
                Point::new(center_x, 420.0),
                Point::new(center_x + 100.0, 300.0),
            ],
        )
    }

    #[test]
    fn test_head_height_band() {
        let mut owned = Owned::gray(200);
        // Defaults: (460 - 140) / 600 = 53.3%
        let v = owned.eval(&HeadHeightRule::default());
        assert!(v.is_pass());
        assert_eq!(v.detail, "53.3%");

        owned.lines.drag(LineId::Chin, 140.0 + 0.69 * 600.0 + 1.0);
        assert!(owned.eval(&HeadHeightRule::default()).is_fail());

        owned.lines.drag(LineId::Chin, 140.0 + 300.0);
        assert!(owned.eval(&HeadHeightRule::default()).is_pass());

        owned.lines.drag(LineId::Chin, 140.0 + 299.0);
        assert!(owned.eval(&HeadHeightRule::default()).is_fail());
    }

    #[test]
    fn test_eye_level_band() {
        let mut owned = Owned::gray(200);
        // Default eye line sits at 50%
        assert!(owned.eval(&EyeLevelRule::default()).is_fail());

        owned.lines.drag(LineId::Eye, 240.0);
        let v = owned.eval(&EyeLevelRule::default());
        assert!(v.is_pass());
        assert_eq!(v.detail, "60.0%");

        owned.lines.drag(LineId::Eye, 180.0);
        assert!(owned.eval(&EyeLevelRule::default()).is_fail());
    }

    #[test]
    fn test_require_face_gates_line_rules() {
        let owned = Owned::gray(200);
        let v = owned.eval(&HeadHeightRule { require_face: true });
        assert!(v.is_fail());
        assert_eq!(v.detail, NO_DETECTION);
        assert!(owned.eval(&EyeLevelRule { require_face: true }).is_fail());

        let mut owned = Owned::gray(200);
        owned.detection = Some(level_face(300.0));
        assert!(owned.eval(&HeadHeightRule { require_face: true }).is_pass());
    }

    #[test]
    fn test_face_centering() {
        let mut owned = Owned::gray(200);
        let v = owned.eval(&FaceCenteringRule);
        assert!(v.is_fail());
        assert_eq!(v.detail, NO_DETECTION);

        owned.detection = Some(level_face(324.0));
        let v = owned.eval(&FaceCenteringRule);
        assert!(v.is_pass());
        assert_eq!(v.detail, "4.0%");

        owned.detection = Some(level_face(331.0));
        assert!(owned.eval(&FaceCenteringRule).is_fail());
    }

    #[test]
    fn test_tilt_without_detection_fails_with_reason() {
        let owned = Owned::gray(200);
        for strategy in [TiltStrategy::EyeSlope, TiltStrategy::JawVector] {
            let v = owned.eval(&HeadTiltRule { strategy });
            assert!(v.is_fail());
            assert!(!v.detail.is_empty());
        }
    }

    #[test]
    fn test_eye_slope_angle() {
        let level = level_face(300.0);
        assert!(eye_slope_angle(&level).unwrap().abs() < 1e-9);

        // 45° when the right eye is as much lower as it is further right
        let tilted = face(
            300.0,
            Point::new(250.0, 240.0),
            Point::new(350.0, 340.0),
            Vec::new(),
        );
        assert!((eye_slope_angle(&tilted).unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_eyes_use_epsilon() {
        let det = face(
            300.0,
            Point::new(300.0, 240.0),
            Point::new(300.0, 250.0),
            Vec::new(),
        );
        let angle = eye_slope_angle(&det).unwrap();
        assert!(angle.is_finite());
        assert!(angle > 89.0 && angle < 90.0, "{angle}");

        let same = face(300.0, Point::new(300.0, 240.0), Point::new(300.0, 240.0), Vec::new());
        assert!(eye_slope_angle(&same).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_tilt_threshold() {
        let dy = 100.0 * MAX_TILT_DEGREES.to_radians().tan();
        let mut owned = Owned::gray(200);
        owned.detection = Some(face(
            300.0,
            Point::new(250.0, 240.0),
            Point::new(350.0, 240.0 + dy * 0.98),
            Vec::new(),
        ));
        let v = owned.eval(&HeadTiltRule::default());
        assert!(v.is_pass(), "{}", v.detail);
        assert_eq!(v.detail, "4.9°");

        owned.detection = Some(face(
            300.0,
            Point::new(250.0, 240.0),
            Point::new(350.0, 240.0 + dy * 1.1),
            Vec::new(),
        ));
        assert!(owned.eval(&HeadTiltRule::default()).is_fail());
    }

    #[test]
    fn test_jaw_vector() {
        let mut owned = Owned::gray(200);
        owned.detection = Some(level_face(300.0));
        let rule = HeadTiltRule {
            strategy: TiltStrategy::JawVector,
        };
        let v = owned.eval(&rule);
        assert!(v.is_pass());
        assert_eq!(v.detail, "0.0°");

        let mut det = level_face(300.0);
        det.landmarks.jaw_outline = vec![Point::new(200.0, 300.0), Point::new(400.0, 340.0)];
        // atan(40 / 200) = 11.3°
        owned.detection = Some(det);
        let v = owned.eval(&rule);
        assert!(v.is_fail());
        assert_eq!(v.detail, "11.3°");
    }

    #[test]
    fn test_incomplete_landmarks_fail() {
        let mut owned = Owned::gray(200);
        let mut det = level_face(300.0);
        det.landmarks = Landmarks::default();
        owned.detection = Some(det);
        for strategy in [TiltStrategy::EyeSlope, TiltStrategy::JawVector] {
            let v = owned.eval(&HeadTiltRule { strategy });
            assert!(v.is_fail());
            assert_eq!(v.detail, "Landmarks incomplete");
        }
    }
}
