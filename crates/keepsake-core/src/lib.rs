//! Keepsake Core — shared presentation abstractions.
//!
//! This crate defines the vocabulary every other crate speaks: the error
//! taxonomy, the clock used to stamp events, event metadata, and the ports
//! through which the engine reaches the view and the ambient audio. It
//! contains no timing or rendering code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod media;
pub mod view;
