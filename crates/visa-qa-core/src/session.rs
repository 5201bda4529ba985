//! Session state and collaborator orchestration.
//!
//! A [`Session`] is a value: every transition takes it by value and returns the
//! next state. [`ingest`] is the only asynchronous step; it awaits the face
//! detector and the metadata reader with bounded waits and never fails.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

use crate::domain::{
    ComplianceReport, Detection, ImageDimensions, LineReport, MetadataMap, Upload, VerdictSet,
};
use crate::engine::ComplianceEngine;
use crate::geometry::{GuideLines, LineId};
use crate::ports::{FaceDetector, MetadataReader};
use crate::rules::Snapshot;

/// Default bound on a face detection.
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default bound on metadata extraction.
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_millis(2000);

/// Errors raised by session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A check was requested before any photo was uploaded.
    #[error("no photo uploaded")]
    NoUpload,
}

/// External collaborators consulted when a photo arrives.
#[derive(Clone)]
pub struct Collaborators {
    /// Face detector, if detection is enabled.
    pub detector: Option<Arc<dyn FaceDetector>>,
    /// Metadata reader, if metadata extraction is enabled.
    pub metadata: Option<Arc<dyn MetadataReader>>,
    /// Bound on a detection.
    pub detect_timeout: Duration,
    /// Bound on a metadata extraction.
    pub metadata_timeout: Duration,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            detector: None,
            metadata: None,
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("detector", &self.detector.as_ref().map(|d| d.name()))
            .field("metadata", &self.metadata.is_some())
            .field("detect_timeout", &self.detect_timeout)
            .field("metadata_timeout", &self.metadata_timeout)
            .finish()
    }
}

impl Collaborators {
    /// Sets the face detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Sets the metadata reader.
    #[must_use]
    pub fn with_metadata_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.metadata = Some(reader);
        self
    }

    /// Sets both timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, detect: Duration, metadata: Duration) -> Self {
        self.detect_timeout = detect;
        self.metadata_timeout = metadata;
        self
    }
}

/// An upload together with whatever the collaborators produced for it.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// The decoded upload.
    pub upload: Arc<Upload>,
    /// Face detection, or `None` if unavailable.
    pub detection: Option<Detection>,
    /// Metadata, or `None` if unavailable.
    pub metadata: Option<MetadataMap>,
}

/// Runs the detector and the metadata reader concurrently, each with its own bound.
///
/// A failure, panic or timeout of either collaborator degrades to `None` and is
/// logged; the other result is kept.
pub async fn ingest(upload: Arc<Upload>, collaborators: &Collaborators) -> Ingested {
    let detect_job = collaborators.detector.clone().map(|detector| {
        let upload = Arc::clone(&upload);
        move || detector.detect(&upload)
    });
    let metadata_job = collaborators.metadata.clone().map(|reader| {
        let upload = Arc::clone(&upload);
        move || reader.extract(upload.bytes())
    });

    let (detection, metadata) = tokio::join!(
        bounded("detector", collaborators.detect_timeout, detect_job),
        bounded("metadata", collaborators.metadata_timeout, metadata_job),
    );

    info!(
        file = %upload.attributes.filename,
        detected_face = detection.is_some(),
        has_metadata = metadata.is_some(),
        "Ingested upload"
    );
    Ingested {
        upload,
        detection,
        metadata,
    }
}

async fn bounded<T, F>(collaborator: &'static str, limit: Duration, job: Option<F>) -> Option<T>
where
    F: FnOnce() -> anyhow::Result<Option<T>> + Send + 'static,
    T: Send + 'static,
{
    let job = job?;
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(job)).await {
        Ok(Ok(Ok(value))) => value,
        Ok(Ok(Err(e))) => {
            warn!(collaborator, error = %format!("{e:#}"), "Collaborator failed");
            None
        }
        Ok(Err(e)) => {
            warn!(collaborator, error = %e, "Collaborator task aborted");
            None
        }
        Err(_) => {
            warn!(
                collaborator,
                timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "Collaborator timed out"
            );
            None
        }
    }
}

/// State of one checking session.
#[derive(Debug, Clone)]
pub struct Session {
    upload: Option<Arc<Upload>>,
    lines: GuideLines,
    detection: Option<Detection>,
    metadata: Option<MetadataMap>,
    pointer: Option<LineId>,
    verdicts: VerdictSet,
}

impl Session {
    /// An empty session: default lines, every rule of `engine` pending.
    #[must_use]
    pub fn new(engine: &ComplianceEngine) -> Self {
        Self {
            upload: None,
            lines: GuideLines::new(),
            detection: None,
            metadata: None,
            pointer: None,
            verdicts: engine.pending(),
        }
    }

    /// Replaces the upload, detection, metadata and all three guide lines at once.
    ///
    /// Lines are seeded from the detection, or reset to defaults without one.
    /// Verdicts go back to pending.
    #[must_use]
    pub fn with_ingested(mut self, ingested: Ingested, engine: &ComplianceEngine) -> Self {
        self.lines = GuideLines::seeded(ingested.detection.as_ref());
        debug!(
            head_top = self.lines.head_top(),
            chin = self.lines.chin(),
            eye = self.lines.eye(),
            "Seeded guide lines"
        );
        self.upload = Some(ingested.upload);
        self.detection = ingested.detection;
        self.metadata = ingested.metadata;
        self.pointer = None;
        self.verdicts = engine.pending();
        self
    }

    /// Grabs the line under `y`, if any.
    #[must_use]
    pub fn pointer_down(mut self, y: f64) -> Self {
        self.pointer = self.lines.hit_test(y);
        self
    }

    /// Drags the grabbed line to `y`. No-op without a grabbed line.
    #[must_use]
    pub fn pointer_move(mut self, y: f64) -> Self {
        if let Some(line) = self.pointer {
            self.lines.drag(line, y);
        }
        self
    }

    /// Releases the grabbed line.
    #[must_use]
    pub fn pointer_up(mut self) -> Self {
        self.pointer = None;
        self
    }

    /// Moves a line directly.
    #[must_use]
    pub fn drag(mut self, line: LineId, y: f64) -> Self {
        self.lines.drag(line, y);
        self
    }

    /// Puts the guide lines back at their defaults.
    #[must_use]
    pub fn reset_lines(mut self) -> Self {
        self.lines.reset();
        self.pointer = None;
        self
    }

    /// Discards the upload, detection and metadata; verdicts go back to pending.
    #[must_use]
    pub fn clear(mut self, engine: &ComplianceEngine) -> Self {
        self.upload = None;
        self.detection = None;
        self.metadata = None;
        self.pointer = None;
        self.lines.reset();
        self.verdicts = engine.pending();
        self
    }

    /// Evaluates every rule against the current state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoUpload`] if no photo has been uploaded.
    pub fn evaluate(
        &self,
        engine: &ComplianceEngine,
        now: Date,
    ) -> Result<VerdictSet, SessionError> {
        let snapshot = self.snapshot(now).ok_or(SessionError::NoUpload)?;
        Ok(engine.evaluate(snapshot))
    }

    /// Stores the verdicts of a run.
    #[must_use]
    pub fn with_verdicts(mut self, verdicts: VerdictSet) -> Self {
        self.verdicts = verdicts;
        self
    }

    /// Borrowed view of the current state for the engine.
    #[must_use]
    pub fn snapshot(&self, now: Date) -> Option<Snapshot<'_>> {
        let upload = self.upload.as_deref()?;
        Some(Snapshot {
            file: &upload.attributes,
            frame: upload.frame(),
            native: upload.native(),
            lines: &self.lines,
            detection: self.detection.as_ref(),
            metadata: self.metadata.as_ref(),
            now,
        })
    }

    /// Report of the current state and last verdicts.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoUpload`] if no photo has been uploaded.
    pub fn report(
        &self,
        timestamp: String,
        include_metadata: bool,
    ) -> Result<ComplianceReport, SessionError> {
        let upload = self.upload.as_deref().ok_or(SessionError::NoUpload)?;
        let path = upload.source_path.as_ref().map_or_else(
            || upload.attributes.filename.clone(),
            |p| p.display().to_string(),
        );
        Ok(ComplianceReport {
            path,
            timestamp,
            dimensions: ImageDimensions {
                width: upload.attributes.width,
                height: upload.attributes.height,
            },
            detected_face: self.detection.is_some(),
            lines: LineReport::from(&self.lines),
            verdicts: self.verdicts.clone(),
            metadata: if include_metadata {
                self.metadata.clone()
            } else {
                None
            },
        })
    }

    /// The current upload.
    #[must_use]
    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_deref()
    }

    /// Current guide lines.
    #[must_use]
    pub const fn lines(&self) -> &GuideLines {
        &self.lines
    }

    /// Current detection.
    #[must_use]
    pub const fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }

    /// Current metadata.
    #[must_use]
    pub const fn metadata(&self) -> Option<&MetadataMap> {
        self.metadata.as_ref()
    }

    /// Line currently grabbed by the pointer.
    #[must_use]
    pub const fn pointer(&self) -> Option<LineId> {
        self.pointer
    }

    /// Verdicts of the last run, or pending.
    #[must_use]
    pub const fn verdicts(&self) -> &VerdictSet {
        &self.verdicts
    }
}
