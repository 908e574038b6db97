//! Output generation for the chat.
//!
//! # Submodules
//!
//! - [`results`]: Turns fetched articles into a view-model and markdown text
//! - [`terminal`]: Prints the transcript and reads picks from stdin

pub mod results;
pub mod terminal;
