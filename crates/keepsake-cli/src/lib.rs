//! Keepsake — terminal front end.
//!
//! Maps the presentation's ports onto a terminal: the view surface prints
//! to a writer, user inputs come from stdin lines, and a tokio task keeps
//! presentation time in step with the wall clock.

pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod terminal;
