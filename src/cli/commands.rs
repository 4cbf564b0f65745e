//! Command interpreter
//!
//! This module turns a typed line into a `Command`, runs it against a
//! `Store`, and shapes the store's answer into display text.

use crate::error::{Arity, RedisTuiError, Result};
use crate::store::Store;

/// Text shown when GET finds no value
pub const NIL_PLACEHOLDER: &str = "(nil)";

/// Text shown when KEYS matches nothing
pub const EMPTY_KEYS: &str = "(empty list or set)";

/// A verb the interpreter handles itself, with validated arguments
#[derive(Debug, Clone, PartialEq)]
pub enum KnownCommand {
    /// Fetch a single key
    Get { key: String },
    /// Store a value; the value is every remaining token joined by spaces
    Set { key: String, value: String },
    /// Delete one or more keys
    Del { keys: Vec<String> },
    /// List keys matching a glob pattern
    Keys { pattern: String },
    /// Liveness check
    Ping,
    /// Count keys in the selected database
    DbSize,
    /// Clear the selected database
    FlushDb,
}

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// One of the verbs in the dispatch table
    Known(KnownCommand),
    /// Any other verb, passed through untouched
    Generic { tokens: Vec<String> },
}

/// Verbs with dedicated handling, their arity, and an example for help text
pub const KNOWN_VERBS: &[(&str, Arity, &str)] = &[
    ("GET", Arity::Exactly(1), "GET mykey"),
    ("SET", Arity::AtLeast(2), "SET mykey some value"),
    ("DEL", Arity::AtLeast(1), "DEL key1 key2"),
    ("KEYS", Arity::Exactly(1), "KEYS user:*"),
    ("PING", Arity::Exactly(0), "PING"),
    ("DBSIZE", Arity::Exactly(0), "DBSIZE"),
    ("FLUSHDB", Arity::Exactly(0), "FLUSHDB"),
];

fn arity_of(verb: &str) -> Option<Arity> {
    KNOWN_VERBS
        .iter()
        .find(|(name, _, _)| *name == verb)
        .map(|(_, arity, _)| *arity)
}

impl Command {
    /// Parse a command from user input.
    ///
    /// Returns `Ok(None)` for a blank line. Arity is checked here, so an
    /// invalid known command never reaches a store.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let tokens: Vec<String> = input.split_whitespace().map(String::from).collect();
        let Some(first) = tokens.first() else {
            return Ok(None);
        };

        let verb = first.to_uppercase();
        let Some(arity) = arity_of(&verb) else {
            return Ok(Some(Command::Generic { tokens }));
        };

        let mut args = tokens.into_iter().skip(1).collect::<Vec<_>>();
        if !arity.accepts(args.len()) {
            return Err(RedisTuiError::arity(&verb, arity));
        }

        let known = match verb.as_str() {
            "GET" => KnownCommand::Get {
                key: args.remove(0),
            },
            "SET" => {
                let key = args.remove(0);
                KnownCommand::Set {
                    key,
                    value: args.join(" "),
                }
            }
            "DEL" => KnownCommand::Del { keys: args },
            "KEYS" => KnownCommand::Keys {
                pattern: args.remove(0),
            },
            "PING" => KnownCommand::Ping,
            "DBSIZE" => KnownCommand::DbSize,
            _ => KnownCommand::FlushDb,
        };

        Ok(Some(Command::Known(known)))
    }

    /// Verb as it should appear in logs
    pub fn verb(&self) -> String {
        match self {
            Command::Known(known) => match known {
                KnownCommand::Get { .. } => "GET",
                KnownCommand::Set { .. } => "SET",
                KnownCommand::Del { .. } => "DEL",
                KnownCommand::Keys { .. } => "KEYS",
                KnownCommand::Ping => "PING",
                KnownCommand::DbSize => "DBSIZE",
                KnownCommand::FlushDb => "FLUSHDB",
            }
            .to_string(),
            Command::Generic { tokens } => tokens
                .first()
                .map(|t| t.to_uppercase())
                .unwrap_or_default(),
        }
    }
}

/// Run a command against the store and return the text to display
pub async fn execute(command: &Command, store: &mut dyn Store) -> Result<String> {
    match command {
        Command::Known(KnownCommand::Get { key }) => Ok(store
            .get(key)
            .await?
            .unwrap_or_else(|| NIL_PLACEHOLDER.to_string())),
        Command::Known(KnownCommand::Set { key, value }) => store.set(key, value).await,
        Command::Known(KnownCommand::Del { keys }) => {
            let removed = store.del(keys).await?;
            Ok(format!("Deleted {} key(s)", removed))
        }
        Command::Known(KnownCommand::Keys { pattern }) => {
            let keys = store.keys(pattern).await?;
            if keys.is_empty() {
                Ok(EMPTY_KEYS.to_string())
            } else {
                Ok(keys.join("\n"))
            }
        }
        Command::Known(KnownCommand::Ping) => store.ping().await,
        Command::Known(KnownCommand::DbSize) => {
            let size = store.db_size().await?;
            Ok(format!("{} keys", size))
        }
        Command::Known(KnownCommand::FlushDb) => store.flush_db().await,
        Command::Generic { tokens } => Ok(store.execute(tokens).await?.to_string()),
    }
}

/// Parse and run a line. `Ok(None)` means the line was blank.
pub async fn interpret(line: &str, store: &mut dyn Store) -> Result<Option<String>> {
    let Some(command) = Command::parse(line)? else {
        return Ok(None);
    };

    tracing::debug!(verb = %command.verb(), "dispatching command");
    let result = execute(&command, store).await;
    if let Err(e) = &result {
        tracing::warn!(verb = %command.verb(), error = %e, "command failed");
    }
    result.map(Some)
}

/// Format an error for display
pub fn format_error(error: &RedisTuiError) -> String {
    format!("Error: {}", error)
}
