//! Visa QA Core - Domain logic and compliance rules
//!
//! This crate contains the guide-line model, pixel analysis, the compliance
//! rules and engine, the session state machine and the port traits adapters
//! implement.

pub mod analysis;
pub mod domain;
pub mod engine;
pub mod geometry;
pub mod ports;
pub mod rules;
pub mod session;

pub use domain::{
    ComplianceReport, Detection, FileAttributes, MetadataMap, RuleId, Status, Upload, UploadError,
    Verdict, VerdictSet,
};
pub use engine::{ComplianceEngine, EngineConfig};
pub use geometry::{GuideLines, LineId};
pub use ports::{
    FaceDetector, MetadataReader, ProgressEvent, ProgressSink, ReportOutput, UploadSource,
};
pub use session::{ingest, Collaborators, Ingested, Session, SessionError};
