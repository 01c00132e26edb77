//! Keepsake Sequencer — timed reveal primitives.
//!
//! Everything here runs on a virtual millisecond clock owned by
//! [`Scheduler`]. Effects are plain data handed back to the host one at a
//! time, so the host decides what they mean and can cancel a sequence in
//! the middle of an instant.

pub mod scheduler;
pub mod stagger;
pub mod typing;

pub use scheduler::{Fired, Millis, Scheduler, SequenceId};
pub use stagger::{RevealStep, RevealTick, StaggerTiming, StaggeredReveal};
pub use typing::{Typewriter, TypingStep, TypingTick};
