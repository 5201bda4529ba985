//! Compliance engine: one deterministic pass of every configured rule.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::{RuleId, VerdictSet};
use crate::rules::{
    BackgroundRule, ColorDepthRule, ComplianceRule, ContrastRule, ContrastStrategy, DateAgeRule,
    DimensionsRule, EditedRule, EyeLevelRule, FaceCenteringRule, FilenameRule, FormatRule,
    HeadHeightRule, HeadTiltRule, PrivacyRule, RuleContext, ShadowRule, ShadowStrategy, SizeRule,
    Snapshot, TiltStrategy, Variant,
};

/// Strategy selection for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Contrast measurement.
    pub contrast: ContrastStrategy,
    /// Shadow detection.
    pub shadow: ShadowStrategy,
    /// Head tilt measurement.
    pub tilt: TiltStrategy,
    /// Evaluate the corner background rule.
    pub background_check: bool,
    /// Fail head height, eye level and shadow when no face was detected.
    pub require_face: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl EngineConfig {
    /// Range contrast, binary shadow, eye-slope tilt, background on.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            contrast: ContrastStrategy::Range,
            shadow: ShadowStrategy::BinaryThreshold,
            tilt: TiltStrategy::EyeSlope,
            background_check: true,
            require_face: false,
        }
    }

    /// Deviation contrast, ratio shadow, jaw-vector tilt, background off, face required.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            contrast: ContrastStrategy::Stddev,
            shadow: ShadowStrategy::RatioThreshold,
            tilt: TiltStrategy::JawVector,
            background_check: false,
            require_face: true,
        }
    }

    /// Preset for a named variant.
    #[must_use]
    pub const fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Full => Self::full(),
            Variant::Compact => Self::compact(),
        }
    }
}

/// Evaluates every configured rule against a snapshot.
pub struct ComplianceEngine {
    config: EngineConfig,
    rules: Vec<Box<dyn ComplianceRule>>,
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("config", &self.config)
            .field("rules", &self.rule_ids())
            .finish()
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ComplianceEngine {
    /// Builds the rule list for a configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let rules = build_rules(&config);
        debug!(
            rules = rules.len(),
            contrast = %config.contrast,
            shadow = %config.shadow,
            tilt = %config.tilt,
            "Built compliance engine"
        );
        Self { config, rules }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rules this engine evaluates, in display order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Every rule pending, as shown before the first run.
    #[must_use]
    pub fn pending(&self) -> VerdictSet {
        VerdictSet::pending(&self.rule_ids())
    }

    /// Runs every rule once and returns a fresh verdict set.
    #[must_use]
    pub fn evaluate(&self, snapshot: Snapshot<'_>) -> VerdictSet {
        let ctx = RuleContext::new(snapshot);
        let mut verdicts = VerdictSet::new();
        for rule in &self.rules {
            let verdict = rule.evaluate(&ctx);
            trace!(rule = %rule.id(), status = ?verdict.status, detail = %verdict.detail, "Rule evaluated");
            verdicts.insert(rule.id(), verdict);
        }
        debug!(
            failed = verdicts.failed().len(),
            total = verdicts.len(),
            "Compliance run complete"
        );
        verdicts
    }
}

fn build_rules(config: &EngineConfig) -> Vec<Box<dyn ComplianceRule>> {
    let mut rules: Vec<Box<dyn ComplianceRule>> = vec![
        Box::new(DimensionsRule),
        Box::new(SizeRule),
        Box::new(FormatRule),
        Box::new(FilenameRule),
        Box::new(PrivacyRule),
        Box::new(DateAgeRule),
        Box::new(ColorDepthRule),
        Box::new(HeadHeightRule {
            require_face: config.require_face,
        }),
        Box::new(EyeLevelRule {
            require_face: config.require_face,
        }),
        Box::new(FaceCenteringRule),
        Box::new(HeadTiltRule {
            strategy: config.tilt,
        }),
        Box::new(ContrastRule {
            strategy: config.contrast,
        }),
        Box::new(ShadowRule {
            strategy: config.shadow,
            require_face: config.require_face,
        }),
    ];
    if config.background_check {
        rules.push(Box::new(BackgroundRule));
    }
    rules.push(Box::new(EditedRule));
    rules
}
