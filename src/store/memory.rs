//! In-memory store
//!
//! A `Store` kept entirely in process memory. It mirrors the Redis
//! semantics the interpreter relies on and backs the test suite.

use crate::error::{RedisTuiError, Result};
use crate::store::{Reply, Store};
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeMap;

/// In-memory string store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `pairs`
    pub fn with_entries<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&mut self) -> Result<String> {
        Ok("PONG".to_string())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<String> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok("OK".to_string())
    }

    async fn del(&mut self, keys: &[String]) -> Result<i64> {
        let removed = keys
            .iter()
            .filter(|key| self.entries.remove(key.as_str()).is_some())
            .count();
        Ok(removed as i64)
    }

    async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let matcher = glob_to_regex(pattern)?;
        Ok(self
            .entries
            .keys()
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect())
    }

    async fn db_size(&mut self) -> Result<i64> {
        Ok(self.entries.len() as i64)
    }

    async fn flush_db(&mut self) -> Result<String> {
        self.entries.clear();
        Ok("OK".to_string())
    }

    async fn execute(&mut self, tokens: &[String]) -> Result<Reply> {
        let (verb, args) = tokens
            .split_first()
            .ok_or_else(|| RedisTuiError::StoreFailure("empty command".to_string()))?;

        match (verb.to_uppercase().as_str(), args) {
            ("ECHO", [message]) => Ok(Reply::Text(message.clone())),
            ("EXISTS", keys) if !keys.is_empty() => Ok(Reply::Integer(
                keys.iter().filter(|k| self.entries.contains_key(k.as_str())).count() as i64,
            )),
            ("MGET", keys) if !keys.is_empty() => Ok(Reply::Array(
                keys.iter()
                    .map(|k| match self.entries.get(k) {
                        Some(v) => Reply::Text(v.clone()),
                        None => Reply::Nil,
                    })
                    .collect(),
            )),
            ("APPEND", [key, suffix]) => {
                let value = self.entries.entry(key.clone()).or_default();
                value.push_str(suffix);
                Ok(Reply::Integer(value.len() as i64))
            }
            ("STRLEN", [key]) => Ok(Reply::Integer(
                self.entries.get(key).map_or(0, |v| v.len()) as i64,
            )),
            _ => Err(RedisTuiError::StoreFailure(format!(
                "ERR unknown command '{}', with args beginning with: {}",
                verb,
                args.iter()
                    .map(|a| format!("'{}'", a))
                    .collect::<Vec<_>>()
                    .join(" ")
            ))),
        }
    }
}

/// Translate a Redis glob (`*`, `?`, `[...]`, `\x`) into an anchored regex
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&regex::escape(&escaped.to_string())),
                None => out.push_str(r"\\"),
            },
            '[' => {
                let mut class = String::new();
                let mut negate = false;
                let mut first = true;
                while let Some(c) = chars.next() {
                    match c {
                        ']' => break,
                        '^' if first => negate = true,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                class.push_str(&class_char(escaped));
                            }
                        }
                        other => class.push_str(&class_char(other)),
                    }
                    first = false;
                }
                match (class.is_empty(), negate) {
                    (true, false) => out.push_str(r"[^\s\S]"),
                    (true, true) => out.push('.'),
                    (false, _) => {
                        out.push('[');
                        if negate {
                            out.push('^');
                        }
                        out.push_str(&class);
                        out.push(']');
                    }
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');

    Regex::new(&out)
        .map_err(|e| RedisTuiError::StoreFailure(format!("invalid pattern '{}': {}", pattern, e)))
}

fn class_char(c: char) -> String {
    match c {
        '-' => "-".to_string(),
        '\\' | '[' | ']' | '&' | '~' | '^' => format!("\\{}", c),
        other => other.to_string(),
    }
}
