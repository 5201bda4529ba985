//! Progress reporting port for UI integration.

use crate::domain::RuleId;

/// Events emitted while checking a batch of photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Checking started for a photo.
    Started {
        /// Path to the photo.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total photos in batch, if known.
        total: Option<usize>,
    },
    /// Checking completed for a photo.
    Completed {
        /// Path to the photo.
        path: String,
        /// Rules that failed, in rule order.
        failed: Vec<RuleId>,
    },
    /// A photo was skipped due to an error.
    Skipped {
        /// Path to the photo.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All photos have been processed.
    Finished {
        /// Total photos checked.
        processed: usize,
        /// Total photos skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
