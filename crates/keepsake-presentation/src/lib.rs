//! Keepsake — presentation context.
//!
//! Responsible for step progression, the per-step reveal choreography
//! (typed intro, timeline, chat, envelope), user input mapping and the
//! presentation journal.

pub mod application;
pub mod domain;
