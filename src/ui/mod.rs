//! ui
//!
//! Terminal output and interactive prompts.
//!
//! Everything the user sees on stderr/stdout outside of command results
//! goes through [`output`], which gates lines on the resolved verbosity.
//! [`prompts`] holds the confirmation and hidden-password prompts; both
//! refuse to run when stdin is not a terminal.

pub mod output;
pub mod prompts;
