//! Luminance plane and the statistics the photometric rules share.

use super::PixelFrame;

/// Weighted luminance of an RGB triple: `0.299 R + 0.587 G + 0.114 B`.
///
/// Every brightness-based rule uses this exact weighting.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Luminance of every pixel of a frame, computed once and reused.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaPlane {
    values: Vec<f64>,
}

/// Population mean and standard deviation of luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaMoments {
    /// Mean luminance.
    pub mean: f64,
    /// Population standard deviation, `sqrt(E[x²] - E[x]²)`.
    pub std_dev: f64,
}

impl LumaPlane {
    /// Converts a frame to luminance. Alpha is ignored.
    #[must_use]
    pub fn from_frame(frame: &PixelFrame) -> Self {
        let values = frame
            .pixels()
            .map(|[r, g, b, _]| luminance(r, g, b))
            .collect();
        Self { values }
    }

    /// Builds a plane from precomputed values.
    #[must_use]
    pub const fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the plane has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Global `(min, max)` luminance. `(0, 0)` for an empty plane.
    #[must_use]
    pub fn extrema(&self) -> (f64, f64) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        self.values
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Tonal range as a percentage of full scale: `(max - min) / 255 × 100`.
    #[must_use]
    pub fn range_percent(&self) -> f64 {
        let (lo, hi) = self.extrema();
        (hi - lo) / 255.0 * 100.0
    }

    /// Population mean and standard deviation.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn moments(&self) -> LumaMoments {
        if self.values.is_empty() {
            return LumaMoments {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = self.values.len() as f64;
        let (sum, sum_sq) = self
            .values
            .iter()
            .fold((0.0, 0.0), |(s, sq), &v| (s + v, sq + v * v));
        let mean = sum / n;
        // Rounding can push the variance slightly negative on flat images
        let variance = (sum_sq / n - mean * mean).max(0.0);
        LumaMoments {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// Number of samples strictly below `threshold`.
    #[must_use]
    pub fn count_below(&self, threshold: f64) -> usize {
        self.values.iter().filter(|&&v| v < threshold).count()
    }

    /// Fraction of samples strictly below `threshold`. `0` for an empty plane.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn dark_ratio(&self, threshold: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.count_below(threshold) as f64 / self.values.len() as f64
    }

    /// Returns true if any sample is strictly below `threshold`. Stops at the first hit.
    #[must_use]
    pub fn any_below(&self, threshold: f64) -> bool {
        self.values.iter().any(|&v| v < threshold)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn gray_frame(values: &[u8]) -> PixelFrame {
        let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
        PixelFrame::from_raw(values.len() as u32, 1, data).unwrap()
    }

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(255, 0, 0) - 76.245).abs() < 1e-9);
        assert!((luminance(0, 255, 0) - 149.685).abs() < 1e-9);
        assert!((luminance(0, 0, 255) - 29.07).abs() < 1e-9);
    }

    #[test]
    fn test_luminance_of_gray_is_gray() {
        for v in [0u8, 35, 128, 200, 255] {
            assert!((luminance(v, v, v) - f64::from(v)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_extrema_and_range() {
        let plane = LumaPlane::from_frame(&gray_frame(&[10, 200, 90]));
        let (lo, hi) = plane.extrema();
        assert!((lo - 10.0).abs() < 1e-9);
        assert!((hi - 200.0).abs() < 1e-9);
        assert!((plane.range_percent() - 190.0 / 255.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_moments_uniform() {
        let plane = LumaPlane::from_frame(&gray_frame(&[100; 64]));
        let m = plane.moments();
        assert!((m.mean - 100.0).abs() < 1e-9);
        assert!(m.std_dev.abs() < 1e-6, "std_dev={}", m.std_dev);
    }

    #[test]
    fn test_moments_two_levels() {
        // Half 0, half 200: mean 100, sigma 100
        let plane = LumaPlane::from_frame(&gray_frame(&[0, 200, 0, 200]));
        let m = plane.moments();
        assert!((m.mean - 100.0).abs() < 1e-9);
        assert!((m.std_dev - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_dark_ratio_is_strict() {
        let plane = LumaPlane::from_values(vec![39.9, 40.0, 40.1, 200.0]);
        assert_eq!(plane.count_below(40.0), 1);
        assert!((plane.dark_ratio(40.0) - 0.25).abs() < 1e-12);
        assert!(plane.any_below(40.0));
        assert!(!plane.any_below(39.9));
    }

    #[test]
    fn test_empty_plane_is_all_zero() {
        let plane = LumaPlane::from_values(Vec::new());
        assert_eq!(plane.extrema(), (0.0, 0.0));
        assert!(plane.range_percent().abs() < f64::EPSILON);
        assert!(plane.moments().std_dev.abs() < f64::EPSILON);
        assert!(plane.dark_ratio(40.0).abs() < f64::EPSILON);
        assert!(!plane.any_below(255.0));
    }
}
