//! Ambient playback port.

use crate::error::DomainError;

/// Host collaborator that starts the background soundtrack.
pub trait AmbientPlayback {
    /// Starts playback.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MediaPlaybackDenied` when the host refuses to
    /// play (autoplay policy, no audio device).
    fn play(&mut self) -> Result<(), DomainError>;
}

/// Playback that accepts every request and produces no sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayback;

impl AmbientPlayback for SilentPlayback {
    fn play(&mut self) -> Result<(), DomainError> {
        Ok(())
    }
}
