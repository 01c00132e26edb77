//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A pacing, cadence or content value cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A transition named a step that does not exist or is not reachable.
    #[error("invalid step: {0}")]
    InvalidStep(String),

    /// A user input arrived that the current state does not accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The host refused to start ambient playback (e.g. autoplay policy).
    #[error("media playback denied: {0}")]
    MediaPlaybackDenied(String),
}

impl DomainError {
    /// Whether the engine absorbs this error instead of surfacing it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MediaPlaybackDenied(_))
    }
}
