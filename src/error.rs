//! Error types for redis-tui
//!
//! This module defines the error types used throughout the application.

use std::fmt;
use thiserror::Error;

/// Result type alias for redis-tui
pub type Result<T> = std::result::Result<T, RedisTuiError>;

/// Argument count a verb accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments
    Exactly(usize),
    /// `n` or more arguments
    AtLeast(usize),
}

impl Arity {
    /// Check whether `count` arguments satisfy this arity
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (qualifier, n) = match *self {
            Arity::Exactly(n) => ("exactly", n),
            Arity::AtLeast(n) => ("at least", n),
        };
        let noun = if n == 1 { "argument" } else { "arguments" };
        write!(f, "{} {} {}", qualifier, n, noun)
    }
}

/// Main error type for redis-tui
#[derive(Error, Debug)]
pub enum RedisTuiError {
    /// Wrong number of arguments for a known verb
    #[error("{verb} requires {expected}")]
    Arity { verb: String, expected: Arity },

    /// The session has no live store connection
    #[error("not connected to Redis")]
    NotConnected,

    /// Errors reported by the Redis client, shown verbatim
    #[error("{0}")]
    Store(#[from] redis::RedisError),

    /// Errors reported by other store implementations
    #[error("{0}")]
    StoreFailure(String),

    /// Connecting took longer than the configured timeout
    #[error("connection timed out after {0}s")]
    ConnectTimeout(u64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup or drawing errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl RedisTuiError {
    /// Build an arity error for `verb`
    pub fn arity(verb: &str, expected: Arity) -> Self {
        RedisTuiError::Arity {
            verb: verb.to_string(),
            expected,
        }
    }
}
