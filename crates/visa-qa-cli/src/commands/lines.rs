//! Lines command - show the guide lines a photo would start from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;
use visa_qa_adapters::load_upload;
use visa_qa_core::domain::LineReport;
use visa_qa_core::{ingest, Collaborators, ComplianceEngine, ReportOutput, Session};

use super::check::DetectorArgs;
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat};

/// Arguments for the lines command.
#[derive(Args, Clone)]
pub struct LinesArgs {
    /// Photo to inspect
    pub path: PathBuf,

    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl LinesArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.detector = args.detector.with_config(&config.detector);
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        args
    }
}

#[derive(Serialize)]
struct SeededLines {
    path: String,
    detected_face: bool,
    lines: LineReport,
}

/// Run the lines command.
///
/// # Errors
///
/// Returns an error if the photo cannot be loaded or the detector is misconfigured.
pub fn run(args: &LinesArgs) -> Result<()> {
    let upload = load_upload(&args.path)?;

    let mut collaborators = Collaborators::default().with_timeouts(
        args.detector.session_timeout(),
        visa_qa_core::session::DEFAULT_METADATA_TIMEOUT,
    );
    if let Some(detector) = args.detector.detector()? {
        collaborators = collaborators.with_detector(detector);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    let ingested = runtime.block_on(ingest(upload.into(), &collaborators));
    runtime.shutdown_background();

    let engine = ComplianceEngine::default();
    let session = Session::new(&engine).with_ingested(ingested, &engine);
    info!(detected_face = session.detection().is_some(), "Seeded lines");

    let output = JsonOutput::stdout(OutputFormat::Jsonl, args.pretty);
    output.write_value(&SeededLines {
        path: args.path.display().to_string(),
        detected_face: session.detection().is_some(),
        lines: LineReport::from(session.lines()),
    })?;
    output.flush()
}
