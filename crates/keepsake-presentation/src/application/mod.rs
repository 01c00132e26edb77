//! Application services driving the presentation aggregate.

pub mod command_handlers;
pub mod query_handlers;
