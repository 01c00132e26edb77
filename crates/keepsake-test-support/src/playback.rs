//! Ambient playback fake.

use keepsake_core::error::DomainError;
use keepsake_core::media::AmbientPlayback;

/// Counts play requests and answers with a preset outcome.
#[derive(Debug, Default)]
pub struct ScriptedPlayback {
    failure: Option<DomainError>,
    attempts: usize,
}

impl ScriptedPlayback {
    /// A host that always allows playback.
    #[must_use]
    pub fn allowing() -> Self {
        Self::default()
    }

    /// A host that refuses playback, like a browser autoplay policy.
    #[must_use]
    pub fn denying(reason: &str) -> Self {
        Self::failing(DomainError::MediaPlaybackDenied(reason.to_owned()))
    }

    /// A host whose playback fails with `error`.
    #[must_use]
    pub fn failing(error: DomainError) -> Self {
        Self {
            failure: Some(error),
            attempts: 0,
        }
    }

    /// Number of times `play` was called.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl AmbientPlayback for ScriptedPlayback {
    fn play(&mut self) -> Result<(), DomainError> {
        self.attempts += 1;
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
