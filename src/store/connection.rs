//! Redis connection
//!
//! This module provides the `Store` implementation backed by a multiplexed
//! async connection from the `redis` crate.

use crate::config::Config;
use crate::error::{RedisTuiError, Result};
use crate::store::{Reply, Store};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Value;
use tokio::time::timeout;

/// Store backed by a live Redis connection
#[derive(Clone)]
pub struct RedisStore {
    /// Multiplexed connection, opened once at startup
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Open a connection using `config`.
    ///
    /// The attempt is bounded by the configured connect timeout. No
    /// command is sent; callers probe liveness with `ping`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let url = config.connection_url();
        let client = redis::Client::open(url.as_str())?;

        let conn = timeout(
            config.connect_timeout(),
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| RedisTuiError::ConnectTimeout(config.connect_timeout_secs))??;

        tracing::info!(url = %redact(&url), "opened Redis connection");

        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn ping(&mut self) -> Result<String> {
        let pong: String = redis::cmd("PING").query_async(&mut self.conn).await?;
        Ok(pong)
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut self.conn).await?;
        Ok(value.map(lossy))
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<String> {
        let ack: String = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut self.conn)
            .await?;
        Ok(ack)
    }

    async fn del(&mut self, keys: &[String]) -> Result<i64> {
        let removed: i64 = redis::cmd("DEL").arg(keys).query_async(&mut self.conn).await?;
        Ok(removed)
    }

    async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let keys: Vec<Vec<u8>> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.conn)
            .await?;
        Ok(keys.into_iter().map(lossy).collect())
    }

    async fn db_size(&mut self) -> Result<i64> {
        let size: i64 = redis::cmd("DBSIZE").query_async(&mut self.conn).await?;
        Ok(size)
    }

    async fn flush_db(&mut self) -> Result<String> {
        let ack: String = redis::cmd("FLUSHDB").query_async(&mut self.conn).await?;
        Ok(ack)
    }

    async fn execute(&mut self, tokens: &[String]) -> Result<Reply> {
        let (verb, args) = tokens
            .split_first()
            .ok_or_else(|| RedisTuiError::StoreFailure("empty command".to_string()))?;

        let value: Value = redis::cmd(verb).arg(args).query_async(&mut self.conn).await?;
        Ok(to_reply(value))
    }
}

/// Convert a raw Redis value into a `Reply`
fn to_reply(value: Value) -> Reply {
    match value {
        Value::Nil => Reply::Nil,
        Value::Okay => Reply::Status("OK".to_string()),
        Value::SimpleString(s) => Reply::Status(s),
        Value::Int(n) => Reply::Integer(n),
        Value::Double(d) => Reply::Double(d),
        Value::Boolean(b) => Reply::Boolean(b),
        Value::BulkString(bytes) => Reply::Text(lossy(bytes)),
        Value::VerbatimString { text, .. } => Reply::Text(text),
        Value::Array(items) | Value::Set(items) => {
            Reply::Array(items.into_iter().map(to_reply).collect())
        }
        Value::Map(pairs) => Reply::Array(
            pairs
                .into_iter()
                .flat_map(|(k, v)| [to_reply(k), to_reply(v)])
                .collect(),
        ),
        other => Reply::Text(format!("{:?}", other)),
    }
}

/// Binary-safe values and key names, invalid UTF-8 replaced with U+FFFD
fn lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Mask the password portion of a connection URL
pub fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
