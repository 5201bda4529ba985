//! Interchangeable measurement strategies for contrast, shadow and tilt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}' (expected one of: {expected})")]
pub struct ParseStrategyError {
    kind: &'static str,
    name: String,
    expected: &'static str,
}

/// How contrast is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContrastStrategy {
    /// Tonal range `(max - min) / 255` must exceed 40%.
    #[default]
    Range,
    /// Luminance standard deviation must exceed 30.
    Stddev,
}

/// How strong shadows are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowStrategy {
    /// Any pixel with luminance below 30 fails.
    #[default]
    BinaryThreshold,
    /// At most 10% of pixels may have luminance below 40.
    RatioThreshold,
}

/// Which landmarks define the head tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiltStrategy {
    /// Line through the two eye-group centroids.
    #[default]
    EyeSlope,
    /// Vector from the first to the last jaw point.
    JawVector,
}

/// Named rule-set preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Range contrast, binary shadow, eye-slope tilt, background check.
    #[default]
    Full,
    /// Deviation contrast, ratio shadow, jaw-vector tilt, face required.
    Compact,
}

macro_rules! named_strategy {
    ($ty:ty, $kind:literal, $( $variant:path => $name:literal ),+ $(,)?) => {
        impl $ty {
            /// Configuration name of the strategy.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $variant => $name, )+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseStrategyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $name => Ok($variant), )+
                    _ => Err(ParseStrategyError {
                        kind: $kind,
                        name: s.to_string(),
                        expected: concat!($( $name, ", " ),+).trim_end_matches(", "),
                    }),
                }
            }
        }
    };
}

named_strategy!(ContrastStrategy, "contrast strategy",
    ContrastStrategy::Range => "range",
    ContrastStrategy::Stddev => "stddev",
);
named_strategy!(ShadowStrategy, "shadow strategy",
    ShadowStrategy::BinaryThreshold => "binary-threshold",
    ShadowStrategy::RatioThreshold => "ratio-threshold",
);
named_strategy!(TiltStrategy, "tilt strategy",
    TiltStrategy::EyeSlope => "eye-slope",
    TiltStrategy::JawVector => "jaw-vector",
);
named_strategy!(Variant, "variant",
    Variant::Full => "full",
    Variant::Compact => "compact",
);
