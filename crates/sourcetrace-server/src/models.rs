//! Database models for sourcetrace.

pub mod capture;
pub mod capture_artifact;
pub mod event_log;
pub mod source;

pub use capture::Capture;
pub use capture_artifact::{ArtifactKind, CaptureArtifact};
pub use event_log::EventLog;
pub use source::Source;
