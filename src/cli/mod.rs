//! CLI module
//!
//! This module provides the interactive interface: the command
//! interpreter, the session state, its view and the terminal loop.

pub mod commands;
pub mod repl;
pub mod session;
pub mod view;

// Re-exports
pub use repl::Repl;
pub use session::Session;
