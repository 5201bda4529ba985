//! Face detection results, expressed in normalized frame coordinates.

use serde::{Deserialize, Serialize};

/// A 2D point in the normalized 600×600 frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centroid of a point group, or `None` when the group is empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let n = points.len() as f64;
        Some(Self::new(sx / n, sy / n))
    }
}

/// Face bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl FaceBox {
    /// Horizontal center of the box.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Bottom edge of the box.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Landmark point groups used by the geometry rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    /// Outline of the left eye.
    pub left_eye: Vec<Point>,
    /// Outline of the right eye.
    pub right_eye: Vec<Point>,
    /// Jaw outline from one ear to the other.
    pub jaw_outline: Vec<Point>,
}

/// Single-face detector output for one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    /// Face bounding box.
    #[serde(rename = "box")]
    pub bbox: FaceBox,
    /// Facial landmark groups.
    #[serde(default)]
    pub landmarks: Landmarks,
}

impl Detection {
    /// Middle element of the jaw outline (the chin point).
    #[must_use]
    pub fn chin_point(&self) -> Option<Point> {
        let jaw = &self.landmarks.jaw_outline;
        jaw.get(jaw.len() / 2).copied()
    }

    /// Centroids of the left and right eye groups.
    #[must_use]
    pub fn eye_centers(&self) -> (Option<Point>, Option<Point>) {
        (
            Point::mean(&self.landmarks.left_eye),
            Point::mean(&self.landmarks.right_eye),
        )
    }
}
