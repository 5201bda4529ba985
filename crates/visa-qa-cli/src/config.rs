//! Configuration file support for visa-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/visa-qa/config.toml` (lowest priority)
//! - Project-local: `.visa-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};
use visa_qa_core::rules::{ContrastStrategy, ShadowStrategy, TiltStrategy, Variant};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Rule preset and strategy selection.
    pub rules: RulesConfig,
    /// Face detector settings.
    pub detector: DetectorConfig,
    /// Metadata reader settings.
    pub metadata: MetadataConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Rule preset and strategies. Unset strategies come from the preset.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Preset: `full` or `compact`.
    pub variant: Option<Variant>,
    /// Contrast strategy: `range` or `stddev`.
    pub contrast: Option<ContrastStrategy>,
    /// Shadow strategy: `binary-threshold` or `ratio-threshold`.
    pub shadow: Option<ShadowStrategy>,
    /// Head tilt strategy: `eye-slope` or `jaw-vector`.
    pub tilt: Option<TiltStrategy>,
    /// Evaluate the background corners.
    pub background: Option<bool>,
    /// Fail line and shadow rules when no face was detected.
    pub require_face: Option<bool>,
}

/// Face detector configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Enable/disable face detection.
    pub enabled: Option<bool>,
    /// Directory holding landmark sidecars instead of each photo's directory.
    pub sidecar: Option<PathBuf>,
    /// External detector command line; replaces the sidecar reader.
    pub command: Option<String>,
    /// Detection timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Metadata reader configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Enable/disable EXIF extraction.
    pub enabled: Option<bool>,
    /// Extraction timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Include extracted metadata in reports.
    pub metadata: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/visa-qa/config.toml`
    /// 2. Project-local: `.visa-qa.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }
        if self.detector.timeout_ms == Some(0) {
            return Err("detector.timeout_ms must be greater than 0".to_string());
        }
        if self.metadata.timeout_ms == Some(0) {
            return Err("metadata.timeout_ms must be greater than 0".to_string());
        }
        if let Some(ref cmd) = self.detector.command {
            if cmd.trim().is_empty() {
                return Err("detector.command must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Rules
        self.rules.variant = other.rules.variant.or(self.rules.variant);
        self.rules.contrast = other.rules.contrast.or(self.rules.contrast);
        self.rules.shadow = other.rules.shadow.or(self.rules.shadow);
        self.rules.tilt = other.rules.tilt.or(self.rules.tilt);
        self.rules.background = other.rules.background.or(self.rules.background);
        self.rules.require_face = other.rules.require_face.or(self.rules.require_face);

        // Detector
        self.detector.enabled = other.detector.enabled.or(self.detector.enabled);
        self.detector.sidecar = other
            .detector
            .sidecar
            .or_else(|| self.detector.sidecar.take());
        self.detector.command = other
            .detector
            .command
            .or_else(|| self.detector.command.take());
        self.detector.timeout_ms = other.detector.timeout_ms.or(self.detector.timeout_ms);

        // Metadata
        self.metadata.enabled = other.metadata.enabled.or(self.metadata.enabled);
        self.metadata.timeout_ms = other.metadata.timeout_ms.or(self.metadata.timeout_ms);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.metadata = other.output.metadata.or(self.output.metadata);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("visa-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.visa-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".visa-qa.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
