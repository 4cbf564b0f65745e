//! Store module
//!
//! This module defines the operations the client needs from a key-value
//! store, the Redis-backed implementation, and an in-memory implementation.

pub mod connection;
pub mod memory;

// Re-exports
pub use connection::RedisStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Reply to a generic command, independent of the wire format
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// No value
    Nil,
    /// Status line such as `OK`
    Status(String),
    /// Integer reply
    Integer(i64),
    /// Text (bulk string) reply
    Text(String),
    /// Floating point reply
    Double(f64),
    /// Boolean reply
    Boolean(bool),
    /// Nested replies
    Array(Vec<Reply>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Status(s) | Reply::Text(s) => write!(f, "{}", s),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Double(d) => write!(f, "{}", d),
            Reply::Boolean(b) => write!(f, "{}", b),
            Reply::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Operations the client performs against the store.
///
/// `get` distinguishes an absent key (`Ok(None)`) from a failure; every
/// other method reports absence as an ordinary value (zero, empty list).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send {
    /// Liveness check
    async fn ping(&mut self) -> Result<String>;

    /// Fetch the value stored at `key`
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key`, returning the acknowledgement
    async fn set(&mut self, key: &str, value: &str) -> Result<String>;

    /// Delete `keys`, returning how many existed
    async fn del(&mut self, keys: &[String]) -> Result<i64>;

    /// List keys matching a glob `pattern`
    async fn keys(&mut self, pattern: &str) -> Result<Vec<String>>;

    /// Number of keys in the selected database
    async fn db_size(&mut self) -> Result<i64>;

    /// Remove every key from the selected database
    async fn flush_db(&mut self) -> Result<String>;

    /// Run an arbitrary command; `tokens[0]` is the verb
    async fn execute(&mut self, tokens: &[String]) -> Result<Reply>;
}
