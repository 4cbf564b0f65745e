//! redis-tui Library
//!
//! This is the library interface for redis-tui.
//! The main binary is in src/main.rs.

pub mod cli;
pub mod config;
pub mod error;
pub mod store;
