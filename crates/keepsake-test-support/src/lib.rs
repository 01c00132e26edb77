//! Shared test fakes and utilities for the Keepsake presentation engine.

mod clock;
mod playback;
mod surface;

pub use clock::FixedClock;
pub use playback::ScriptedPlayback;
pub use surface::{RecordingSurface, SurfaceCall};
