//! Check command - evaluate photos against the compliance rules.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use time::macros::format_description;
use time::Date;
use tracing::{debug, info, warn};
use visa_qa_adapters::{CommandDetector, ExifMetadataReader, FsUploadSource, SidecarDetector};
use visa_qa_core::rules::{ContrastStrategy, ShadowStrategy, TiltStrategy, Variant};
use visa_qa_core::session::{DEFAULT_DETECT_TIMEOUT, DEFAULT_METADATA_TIMEOUT};
use visa_qa_core::{
    ingest, Collaborators, ComplianceEngine, ComplianceReport, EngineConfig, FaceDetector,
    LineId, ProgressEvent, ProgressSink, ReportOutput, Session, Upload, UploadSource,
};

use super::ExitCode;
use crate::config::{AppConfig, DetectorConfig};
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Parse a normalized Y offset.
fn parse_offset(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{value} is not a finite offset"))
    }
}

/// Parse a `YYYY-MM-DD` date.
fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("'{s}' is not a YYYY-MM-DD date: {e}"))
}

/// Extra time a session waits for a detector command to be killed.
const COMMAND_KILL_GRACE: Duration = Duration::from_millis(250);

/// Face detector selection, shared by `check` and `lines`.
#[derive(Args, Clone, Debug, Default)]
pub struct DetectorArgs {
    /// Skip face detection
    #[arg(long)]
    pub no_detect: bool,

    /// Directory holding `<stem>.landmarks.json` sidecars (default: next to each photo)
    #[arg(long, value_name = "DIR")]
    pub sidecar_dir: Option<PathBuf>,

    /// External detector command; the photo path is appended
    #[arg(long, value_name = "CMD")]
    pub detector_cmd: Option<String>,

    /// Detection timeout in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub detect_timeout_ms: Option<u64>,
}

impl DetectorArgs {
    /// Apply the `[detector]` config section, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &DetectorConfig) -> Self {
        if !self.no_detect {
            if let Some(enabled) = config.enabled {
                self.no_detect = !enabled;
            }
        }
        if self.sidecar_dir.is_none() {
            self.sidecar_dir.clone_from(&config.sidecar);
        }
        if self.detector_cmd.is_none() {
            self.detector_cmd.clone_from(&config.command);
        }
        self.detect_timeout_ms = self
            .detect_timeout_ms
            .or(config.timeout_ms.filter(|&ms| ms > 0));
        self
    }

    /// Builds the configured detector. The command detector wins over sidecars.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector command is empty.
    pub fn detector(&self) -> Result<Option<Arc<dyn FaceDetector>>> {
        if self.no_detect {
            return Ok(None);
        }
        if let Some(cmd) = &self.detector_cmd {
            let detector = CommandDetector::from_command_line(cmd)?.with_timeout(self.timeout());
            debug!("Using detector command: {cmd}");
            return Ok(Some(Arc::new(detector)));
        }
        let sidecar = self
            .sidecar_dir
            .as_ref()
            .map_or_else(SidecarDetector::new, SidecarDetector::in_dir);
        Ok(Some(Arc::new(sidecar)))
    }

    /// Detection timeout with fallback to the default.
    pub fn timeout(&self) -> Duration {
        self.detect_timeout_ms
            .map_or(DEFAULT_DETECT_TIMEOUT, Duration::from_millis)
    }

    /// How long a session waits for the detector.
    ///
    /// A detector command gets [`COMMAND_KILL_GRACE`] on top, so it is killed
    /// before the session stops waiting for it.
    pub fn session_timeout(&self) -> Duration {
        if self.detector_cmd.is_some() && !self.no_detect {
            self.timeout() + COMMAND_KILL_GRACE
        } else {
            self.timeout()
        }
    }
}

/// Shared arguments for photo checking.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Photos or directories to check
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Rule preset: full or compact
    #[arg(long, value_name = "NAME")]
    pub variant: Option<Variant>,

    /// Contrast strategy: range or stddev
    #[arg(long, value_name = "NAME")]
    pub contrast: Option<ContrastStrategy>,

    /// Shadow strategy: binary-threshold or ratio-threshold
    #[arg(long, value_name = "NAME")]
    pub shadow: Option<ShadowStrategy>,

    /// Head tilt strategy: eye-slope or jaw-vector
    #[arg(long, value_name = "NAME")]
    pub tilt: Option<TiltStrategy>,

    /// Disable the background corner check
    #[arg(long)]
    pub no_background: bool,

    /// Fail head height, eye level and shadow rules without a detected face
    #[arg(long)]
    pub require_face: bool,

    /// Move the top-of-head line to this offset (0-600)
    #[arg(long, value_name = "Y", value_parser = parse_offset, allow_negative_numbers = true)]
    pub head_top: Option<f64>,

    /// Move the chin line to this offset (0-600)
    #[arg(long, value_name = "Y", value_parser = parse_offset, allow_negative_numbers = true)]
    pub chin: Option<f64>,

    /// Move the eye line to this offset (0-600)
    #[arg(long, value_name = "Y", value_parser = parse_offset, allow_negative_numbers = true)]
    pub eye: Option<f64>,

    /// Ignore detected landmarks and start from the default lines
    #[arg(long)]
    pub reset_lines: bool,

    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Skip EXIF extraction
    #[arg(long)]
    pub no_metadata: bool,

    /// Metadata extraction timeout in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub metadata_timeout_ms: Option<u64>,

    /// Reference date for the photo age rule (default: today, UTC)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub now: Option<Date>,

    /// Include extracted metadata in reports
    #[arg(long)]
    pub include_metadata: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults and the rule preset
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// For boolean flags: CLI `--no-*` always wins. Config can enable/disable
    /// only when the CLI flag wasn't explicitly set.
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Strategies: CLI > config > preset (resolved in engine_config)
        args.variant = args.variant.or(config.rules.variant);
        args.contrast = args.contrast.or(config.rules.contrast);
        args.shadow = args.shadow.or(config.rules.shadow);
        args.tilt = args.tilt.or(config.rules.tilt);

        args.detector = args.detector.with_config(&config.detector);

        if !args.no_metadata {
            if let Some(enabled) = config.metadata.enabled {
                args.no_metadata = !enabled;
            }
        }
        args.metadata_timeout_ms = args
            .metadata_timeout_ms
            .or(config.metadata.timeout_ms.filter(|&ms| ms > 0));

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.include_metadata {
            args.include_metadata = config.output.metadata.unwrap_or(false);
        }

        // Background and require_face need the preset, see engine_config
        args.config = Some(config.clone());

        args
    }

    /// Resolve the engine configuration: preset first, then overrides.
    pub fn engine_config(&self) -> EngineConfig {
        let rules = self.config.as_ref().map(|c| &c.rules);
        let preset = EngineConfig::preset(self.variant.unwrap_or_default());

        EngineConfig {
            contrast: self.contrast.unwrap_or(preset.contrast),
            shadow: self.shadow.unwrap_or(preset.shadow),
            tilt: self.tilt.unwrap_or(preset.tilt),
            background_check: !self.no_background
                && rules
                    .and_then(|r| r.background)
                    .unwrap_or(preset.background_check),
            require_face: self.require_face
                || rules
                    .and_then(|r| r.require_face)
                    .unwrap_or(preset.require_face),
        }
    }

    /// Build the detector and metadata reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector command is empty.
    pub fn collaborators(&self) -> Result<Collaborators> {
        let metadata_timeout = self
            .metadata_timeout_ms
            .map_or(DEFAULT_METADATA_TIMEOUT, Duration::from_millis);
        let mut collaborators = Collaborators::default()
            .with_timeouts(self.detector.session_timeout(), metadata_timeout);

        if let Some(detector) = self.detector.detector()? {
            collaborators = collaborators.with_detector(detector);
        }
        if !self.no_metadata {
            collaborators = collaborators.with_metadata_reader(Arc::new(ExifMetadataReader::new()));
        }
        Ok(collaborators)
    }

    /// Per-photo session steps.
    fn plan(&self) -> SessionPlan {
        let overrides = [
            (LineId::HeadTop, self.head_top),
            (LineId::Chin, self.chin),
            (LineId::Eye, self.eye),
        ]
        .into_iter()
        .filter_map(|(line, y)| y.map(|y| (line, y)))
        .collect();

        SessionPlan {
            reset_lines: self.reset_lines,
            overrides,
            now: self
                .now
                .unwrap_or_else(|| time::OffsetDateTime::now_utc().date()),
            include_metadata: self.include_metadata,
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// What to do with each photo's session between ingest and evaluation.
#[derive(Debug, Clone)]
struct SessionPlan {
    reset_lines: bool,
    overrides: Vec<(LineId, f64)>,
    now: Date,
    include_metadata: bool,
}

/// Result of running the check command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    /// Number of photos checked.
    pub processed: usize,
    /// Number of photos that could not be loaded.
    pub skipped: usize,
    /// Number of photos with at least one failed rule.
    pub failing: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let engine = ComplianceEngine::new(args.engine_config());
    let collaborators = args.collaborators()?;
    debug!(?collaborators, "Configured collaborators");

    let source = FsUploadSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);
    let output = JsonOutput::stdout(args.format(), args.pretty);
    let plan = args.plan();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(check_uploads(
        &source,
        total,
        &engine,
        &collaborators,
        &plan,
        &output,
        &progress_bar,
    ));
    // Timed-out collaborator calls may still be running on the blocking pool
    runtime.shutdown_background();

    let result = result?;
    info!(
        processed = result.processed,
        skipped = result.skipped,
        failing = result.failing,
        "Check finished"
    );
    Ok(result)
}

/// Check every upload of `source` in its own session.
///
/// `total` is the number of photos announced in progress events.
async fn check_uploads(
    source: &dyn UploadSource,
    total: Option<usize>,
    engine: &ComplianceEngine,
    collaborators: &Collaborators,
    plan: &SessionPlan,
    output: &dyn ReportOutput,
    progress: &dyn ProgressSink,
) -> Result<CheckResult> {
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut failing = 0usize;

    for (index, upload_result) in source.uploads().enumerate() {
        let upload = match upload_result {
            Ok(upload) => upload,
            Err(e) => {
                // Note: error message contains the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("photo {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        let path = display_path(&upload);
        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        let report = check_upload(upload, engine, collaborators, plan).await?;
        let failed = report.verdicts.failed();
        if !failed.is_empty() {
            failing += 1;
        }

        progress.on_event(ProgressEvent::Completed { path, failed });
        output.write(&report)?;
        processed += 1;
    }

    output.flush()?;
    progress.on_event(ProgressEvent::Finished { processed, skipped });

    if processed == 0 {
        warn!("No photos were checked");
    }

    let exit_code = if failing > 0 {
        ExitCode::RulesFailed
    } else if skipped > 0 || processed == 0 {
        ExitCode::Error
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        processed,
        skipped,
        failing,
        exit_code,
    })
}

/// Run one session: ingest, adjust lines, evaluate, report.
async fn check_upload(
    upload: Upload,
    engine: &ComplianceEngine,
    collaborators: &Collaborators,
    plan: &SessionPlan,
) -> Result<ComplianceReport> {
    let ingested = ingest(Arc::new(upload), collaborators).await;
    let mut session = Session::new(engine).with_ingested(ingested, engine);

    if plan.reset_lines {
        session = session.reset_lines();
    }
    for &(line, y) in &plan.overrides {
        session = session.drag(line, y);
    }

    let verdicts = session.evaluate(engine, plan.now)?;
    let session = session.with_verdicts(verdicts);
    Ok(session.report(iso_timestamp(), plan.include_metadata)?)
}

fn display_path(upload: &Upload) -> String {
    upload.source_path.as_ref().map_or_else(
        || upload.attributes.filename.clone(),
        |p| p.display().to_string(),
    )
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
