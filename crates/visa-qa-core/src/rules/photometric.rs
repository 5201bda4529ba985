//! Photometric rules over the pixel buffers.

use super::{ComplianceRule, ContrastStrategy, RuleContext, ShadowStrategy};
use crate::analysis::corner_brightness;
use crate::domain::{RuleId, Verdict};

/// Minimum tonal range, percent of full scale, exclusive.
const MIN_RANGE_PERCENT: f64 = 40.0;

/// Minimum luminance standard deviation, exclusive.
const MIN_STD_DEV: f64 = 30.0;

/// Any pixel darker than this is a shadow under the binary strategy.
const SHADOW_BINARY_LEVEL: f64 = 30.0;

/// Pixels darker than this count towards the dark ratio.
const SHADOW_RATIO_LEVEL: f64 = 40.0;

/// Corners must be at least this bright.
const MIN_CORNER_BRIGHTNESS: f64 = 180.0;

/// No transparency in the native image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDepthRule;

impl ComplianceRule for ColorDepthRule {
    fn id(&self) -> RuleId {
        RuleId::ColorDepth
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        if ctx.snapshot().native.is_opaque() {
            Verdict::pass("24-bit")
        } else {
            Verdict::fail("with alpha")
        }
    }
}

/// Global contrast.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastRule {
    /// How contrast is measured.
    pub strategy: ContrastStrategy,
}

impl ComplianceRule for ContrastRule {
    fn id(&self) -> RuleId {
        RuleId::Contrast
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let luma = ctx.luma();
        match self.strategy {
            ContrastStrategy::Range => {
                let pct = luma.range_percent();
                Verdict::from_bool(pct > MIN_RANGE_PERCENT, format!("{pct:.1}%"))
            }
            ContrastStrategy::Stddev => {
                let sd = luma.moments().std_dev;
                Verdict::from_bool(sd > MIN_STD_DEV, format!("σ {sd:.1}"))
            }
        }
    }
}

/// Strong shadows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowRule {
    /// How shadows are detected.
    pub strategy: ShadowStrategy,
    /// Fail outright when no face was detected.
    pub require_face: bool,
}

impl ComplianceRule for ShadowRule {
    fn id(&self) -> RuleId {
        RuleId::Shadow
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        if self.require_face {
            if let Err(verdict) = ctx.require_detection() {
                return verdict;
            }
        }
        let luma = ctx.luma();
        match self.strategy {
            ShadowStrategy::BinaryThreshold => {
                let (min, _) = luma.extrema();
                Verdict::from_bool(
                    !luma.any_below(SHADOW_BINARY_LEVEL),
                    format!("min {min:.0}"),
                )
            }
            ShadowStrategy::RatioThreshold => {
                // At most one pixel in ten, compared in integers
                let dark = luma.count_below(SHADOW_RATIO_LEVEL);
                let ratio = luma.dark_ratio(SHADOW_RATIO_LEVEL) * 100.0;
                Verdict::from_bool(dark * 10 <= luma.len(), format!("{ratio:.2}% dark"))
            }
        }
    }
}

/// Light corners on the processing frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundRule;

impl ComplianceRule for BackgroundRule {
    fn id(&self) -> RuleId {
        RuleId::BackgroundUniformity
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let Some(corners) = corner_brightness(ctx.snapshot().frame) else {
            return Verdict::fail("Empty frame");
        };
        let darkest = corners.iter().copied().fold(f64::MAX, f64::min);
        Verdict::from_bool(
            darkest >= MIN_CORNER_BRIGHTNESS,
            format!("darkest corner {darkest:.0}"),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::analysis::PixelFrame;
    use crate::rules::fixtures::Owned;
    use crate::rules::NO_DETECTION;
    use image::{Rgba, RgbaImage};

    /// 600×600 gray frame whose first `dark` pixels are black.
    fn with_dark_pixels(base: u8, dark: u32) -> PixelFrame {
        let mut img = RgbaImage::from_pixel(600, 600, Rgba([base, base, base, 255]));
        for i in 0..dark {
            img.put_pixel(i % 600, i / 600, Rgba([0, 0, 0, 255]));
        }
        PixelFrame::from_rgba(img)
    }

    #[test]
    fn test_color_depth_uses_native_frame() {
        let mut owned = Owned::gray(200);
        assert_eq!(owned.eval(&ColorDepthRule).detail, "24-bit");

        let mut native = RgbaImage::from_pixel(10, 10, Rgba([200, 200, 200, 255]));
        native.put_pixel(3, 3, Rgba([200, 200, 200, 254]));
        owned.native = PixelFrame::from_rgba(native);
        let v = owned.eval(&ColorDepthRule);
        assert!(v.is_fail());
        assert_eq!(v.detail, "with alpha");
    }

    #[test]
    fn test_contrast_range() {
        let flat = Owned::gray(128);
        let v = flat.eval(&ContrastRule::default());
        assert!(v.is_fail());
        assert_eq!(v.detail, "0.0%");

        let owned = Owned::gray(220).with_frame(with_dark_pixels(220, 1));
        let v = owned.eval(&ContrastRule::default());
        assert!(v.is_pass());
        assert_eq!(v.detail, "86.3%");
    }

    #[test]
    fn test_contrast_stddev() {
        let rule = ContrastRule {
            strategy: ContrastStrategy::Stddev,
        };
        // A single dark pixel barely moves the deviation
        let owned = Owned::gray(220).with_frame(with_dark_pixels(220, 1));
        assert!(owned.eval(&rule).is_fail());

        // Half black, half 200: sigma 100
        let owned = Owned::gray(200).with_frame(with_dark_pixels(200, 180_000));
        let v = owned.eval(&rule);
        assert!(v.is_pass());
        assert_eq!(v.detail, "σ 100.0");
    }

    #[test]
    fn test_shadow_binary() {
        assert!(Owned::gray(30).eval(&ShadowRule::default()).is_pass());
        assert!(Owned::gray(29).eval(&ShadowRule::default()).is_fail());

        let owned = Owned::gray(220).with_frame(with_dark_pixels(220, 1));
        assert!(owned.eval(&ShadowRule::default()).is_fail());
    }

    #[test]
    fn test_shadow_ratio_boundary() {
        let rule = ShadowRule {
            strategy: ShadowStrategy::RatioThreshold,
            require_face: false,
        };
        // 36 000 of 360 000 pixels is exactly 10%
        let owned = Owned::gray(220).with_frame(with_dark_pixels(220, 36_000));
        let v = owned.eval(&rule);
        assert!(v.is_pass(), "{}", v.detail);
        assert_eq!(v.detail, "10.00% dark");

        let owned = Owned::gray(220).with_frame(with_dark_pixels(220, 36_036));
        let v = owned.eval(&rule);
        assert!(v.is_fail());
        assert_eq!(v.detail, "10.01% dark");
    }

    #[test]
    fn test_shadow_require_face() {
        let rule = ShadowRule {
            strategy: ShadowStrategy::RatioThreshold,
            require_face: true,
        };
        let v = Owned::gray(220).eval(&rule);
        assert!(v.is_fail());
        assert_eq!(v.detail, NO_DETECTION);
    }

    #[test]
    fn test_background_corners() {
        assert!(Owned::gray(180).eval(&BackgroundRule).is_pass());
        assert!(Owned::gray(179).eval(&BackgroundRule).is_fail());

        // Only the top-left corner is dark
        let owned = Owned::gray(250).with_frame(with_dark_pixels(250, 1));
        let v = owned.eval(&BackgroundRule);
        assert!(v.is_fail());
        assert_eq!(v.detail, "darkest corner 0");
    }
}
