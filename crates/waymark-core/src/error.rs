//! Tour error types.

use thiserror::Error;

/// Top-level error type shared by every tour component.
///
/// Only configuration errors (`TemplateEmpty`, `InvalidTemplate`) are meant
/// to reach callers. The orchestrator absorbs the transient variants and
/// degrades the affected feature instead.
#[derive(Debug, Error)]
pub enum TourError {
    /// A template with no steps was supplied.
    #[error("tour template `{0}` has no steps")]
    TemplateEmpty(String),

    /// A template or template document failed validation.
    #[error("invalid tour template: {0}")]
    InvalidTemplate(String),

    /// The navigation collaborator could not reach a location.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Narration synthesis or playback failed.
    #[error("narration unavailable: {0}")]
    Narration(String),

    /// Narration synthesis did not answer within the configured timeout.
    #[error("narration timed out after {0} ms")]
    NarrationTimeout(u128),

    /// A flag read or write failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// `start` was called on a sequencer that already left `NotStarted`.
    #[error("tour has already been started")]
    AlreadyStarted,

    /// The tour session has already finished or been closed.
    #[error("tour session has ended")]
    SessionEnded,
}
