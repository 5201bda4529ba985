//! Mock implementations of core port traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use visa_qa_core::domain::{ComplianceReport, Detection, MetadataMap, Upload};
use visa_qa_core::ports::{
    FaceDetector, MetadataReader, ProgressEvent, ProgressSink, ReportOutput, UploadSource,
};

/// Scripted behavior of a mock collaborator.
#[derive(Debug, Clone)]
pub enum Behavior<T> {
    /// Return this value.
    Return(Option<T>),
    /// Fail with this message.
    Fail(String),
    /// Sleep, then return the value.
    Slow(Duration, Option<T>),
}

impl<T: Clone> Behavior<T> {
    fn run(&self) -> anyhow::Result<Option<T>> {
        match self {
            Self::Return(value) => Ok(value.clone()),
            Self::Fail(message) => Err(anyhow::anyhow!("{message}")),
            Self::Slow(delay, value) => {
                std::thread::sleep(*delay);
                Ok(value.clone())
            }
        }
    }
}

/// Mock implementation of `FaceDetector` for testing.
///
/// Follows a scripted [`Behavior`] and counts calls.
pub struct MockFaceDetector {
    behavior: Behavior<Detection>,
    calls: Arc<AtomicUsize>,
}

impl MockFaceDetector {
    /// Always returns the given detection.
    #[must_use]
    pub fn returning(detection: Detection) -> Self {
        Self::with_behavior(Behavior::Return(Some(detection)))
    }

    /// Always reports that no face was found.
    #[must_use]
    pub fn no_face() -> Self {
        Self::with_behavior(Behavior::Return(None))
    }

    /// Always fails.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// Returns the detection after `delay`.
    #[must_use]
    pub fn slow(delay: Duration, detection: Detection) -> Self {
        Self::with_behavior(Behavior::Slow(delay, Some(detection)))
    }

    /// Follows an arbitrary behavior.
    #[must_use]
    pub fn with_behavior(behavior: Behavior<Detection>) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of `detect()` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaceDetector for MockFaceDetector {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn detect(&self, _upload: &Upload) -> anyhow::Result<Option<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behavior.run()
    }
}

/// Mock implementation of `MetadataReader` for testing.
pub struct MockMetadataReader {
    behavior: Behavior<MetadataMap>,
    calls: Arc<AtomicUsize>,
}

impl MockMetadataReader {
    /// Always returns the given map.
    #[must_use]
    pub fn returning(metadata: MetadataMap) -> Self {
        Self::with_behavior(Behavior::Return(Some(metadata)))
    }

    /// Always reports that there is no metadata block.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_behavior(Behavior::Return(None))
    }

    /// Always fails.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// Follows an arbitrary behavior.
    #[must_use]
    pub fn with_behavior(behavior: Behavior<MetadataMap>) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of `extract()` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataReader for MockMetadataReader {
    fn extract(&self, _bytes: &[u8]) -> anyhow::Result<Option<MetadataMap>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behavior.run()
    }
}

/// Mock implementation of `UploadSource` for testing.
///
/// Yields pre-built uploads and tracks iteration for assertions.
pub struct MockUploadSource {
    uploads: Vec<Upload>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockUploadSource {
    /// Creates a new mock source with the given uploads.
    #[must_use]
    pub fn new(uploads: Vec<Upload>) -> Self {
        Self {
            uploads,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl UploadSource for MockUploadSource {
    fn uploads(&self) -> Box<dyn Iterator<Item = anyhow::Result<Upload>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(self.uploads.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.uploads.len())
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    reports: Arc<Mutex<Vec<ComplianceReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<ComplianceReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &ComplianceReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{DetectionBuilder, UploadBuilder};

    #[test]
    fn test_mock_upload_source_empty() {
        let source = MockUploadSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.uploads().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_upload_source_with_uploads() {
        let source = MockUploadSource::new(vec![UploadBuilder::gray(200).build()]);
        assert_eq!(source.count_hint(), Some(1));
        assert_eq!(source.uploads().count(), 1);
    }

    #[test]
    fn test_mock_detector_behaviors() {
        let upload = UploadBuilder::gray(200).build();

        let detector = MockFaceDetector::returning(DetectionBuilder::centered().build());
        assert!(detector.detect(&upload).unwrap().is_some());
        assert!(detector.detect(&upload).unwrap().is_some());
        assert_eq!(detector.call_count(), 2);

        assert!(MockFaceDetector::no_face().detect(&upload).unwrap().is_none());
        assert!(MockFaceDetector::failing("boom").detect(&upload).is_err());
    }

    #[test]
    fn test_mock_metadata_reader() {
        let reader = MockMetadataReader::returning(MetadataMap::new().with("Software", "x"));
        assert_eq!(reader.extract(&[]).unwrap().unwrap().get("Software"), Some("x"));
        assert_eq!(reader.call_count(), 1);
        assert!(MockMetadataReader::empty().extract(&[]).unwrap().is_none());
        assert!(MockMetadataReader::failing("bad").extract(&[]).is_err());
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.jpg".into(),
            index: 0,
            total: Some(1),
        });

        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }
}
