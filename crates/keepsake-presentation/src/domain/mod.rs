//! Domain model of the presentation.

pub mod aggregates;
pub mod commands;
pub mod cues;
pub mod events;
mod initializers;
pub mod pacing;
pub mod script;
