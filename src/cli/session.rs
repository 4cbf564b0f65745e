//! Session state
//!
//! The session owns the store connection and everything the view draws:
//! the input line, the last outcome, the connectivity flag, input history
//! and the verb menu. Key events are applied one at a time.

use crate::cli::commands::{self, KNOWN_VERBS};
use crate::config::Config;
use crate::error::RedisTuiError;
use crate::store::{connection, RedisStore, Store};
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_textarea::{CursorMove, Input, TextArea};

/// Maximum number of characters accepted in the input line
pub const CHAR_LIMIT: usize = 256;

/// Greeting shown after a successful bootstrap
pub const CONNECTED_MESSAGE: &str = "Connected to Redis! Type a command and press Enter.";

/// Result of the last command, or the bootstrap message
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Text produced by a command
    Result { text: String, at: DateTime<Local> },
    /// Error produced by a command
    Error { message: String, at: DateTime<Local> },
}

impl Outcome {
    fn result(text: impl Into<String>) -> Self {
        Outcome::Result {
            text: text.into(),
            at: Local::now(),
        }
    }

    fn error(error: &RedisTuiError) -> Self {
        Outcome::Error {
            message: error.to_string(),
            at: Local::now(),
        }
    }

    /// Check if this outcome is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    /// The displayed text, without any prefix
    pub fn text(&self) -> &str {
        match self {
            Outcome::Result { text, .. } => text,
            Outcome::Error { message, .. } => message,
        }
    }

    /// When the outcome was produced
    pub fn at(&self) -> DateTime<Local> {
        match self {
            Outcome::Result { at, .. } | Outcome::Error { at, .. } => *at,
        }
    }
}

/// What the loop should do after a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading events
    Continue,
    /// Leave the loop
    Quit,
}

/// Interactive session
pub struct Session {
    /// Store connection, absent when it could not be opened
    store: Option<Box<dyn Store>>,
    /// Whether the startup liveness probe succeeded
    connected: bool,
    /// Server address shown in the status line, password masked
    address: Option<String>,
    /// Last outcome shown to the user
    outcome: Option<Outcome>,
    /// Line being edited, always a single line
    input: TextArea<'static>,
    /// Lines submitted so far, oldest first
    history: Vec<String>,
    /// Position while browsing history
    history_pos: Option<usize>,
    /// Selected row while the verb menu is open
    menu: Option<usize>,
    /// Last KEYS listing, for the striped key view
    listed_keys: Option<Vec<String>>,
}

impl Session {
    /// Open the connection described by `config` and probe it once
    pub async fn bootstrap(config: &Config) -> Self {
        let mut session = match RedisStore::connect(config).await {
            Ok(store) => Self::with_store(Box::new(store)).await,
            Err(e) => {
                tracing::error!(error = %e, "could not open Redis connection");
                Self::disconnected(None, &e)
            }
        };
        session.address = Some(connection::redact(&config.connection_url()));
        session
    }

    /// Wrap an open store, probing it once to set the connectivity flag
    pub async fn with_store(mut store: Box<dyn Store>) -> Self {
        match store.ping().await {
            Ok(_) => {
                tracing::info!("Redis liveness probe succeeded");
                let mut session = Self::empty(Some(store));
                session.connected = true;
                session.outcome = Some(Outcome::result(CONNECTED_MESSAGE));
                session
            }
            Err(e) => {
                tracing::error!(error = %e, "Redis liveness probe failed");
                Self::disconnected(Some(store), &e)
            }
        }
    }

    fn disconnected(store: Option<Box<dyn Store>>, error: &RedisTuiError) -> Self {
        let mut session = Self::empty(store);
        session.outcome = Some(Outcome::error(error));
        session
    }

    fn empty(store: Option<Box<dyn Store>>) -> Self {
        Self {
            store,
            connected: false,
            address: None,
            outcome: None,
            input: TextArea::default(),
            history: Vec::new(),
            history_pos: None,
            menu: None,
            listed_keys: None,
        }
    }

    /// Whether commands are sent to the store
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Server address, when the session was bootstrapped from configuration
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Last outcome
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Line being edited
    pub fn input(&self) -> &TextArea<'static> {
        &self.input
    }

    /// Text of the line being edited
    pub fn input_value(&self) -> &str {
        self.input.lines().first().map(String::as_str).unwrap_or_default()
    }

    /// Submitted lines, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Selected menu row, when the verb menu is open
    pub fn menu_selection(&self) -> Option<usize> {
        self.menu
    }

    /// Keys from the last successful KEYS command, if that is what is shown
    pub fn listed_keys(&self) -> Option<&[String]> {
        self.listed_keys.as_deref()
    }

    /// Interpret `line` and record the outcome.
    ///
    /// Blank lines leave the outcome unchanged. While disconnected every
    /// other line is rejected without touching the store.
    pub async fn submit(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        if !self.connected || self.store.is_none() {
            self.set_outcome(Outcome::error(&RedisTuiError::NotConnected), None);
            return;
        }
        let Some(store) = self.store.as_mut() else {
            return;
        };

        match commands::interpret(line, &mut **store).await {
            Ok(Some(text)) => {
                let keys = is_keys_listing(line, &text)
                    .then(|| text.lines().map(String::from).collect());
                self.set_outcome(Outcome::result(text), keys);
            }
            Ok(None) => {}
            Err(e) => self.set_outcome(Outcome::error(&e), None),
        }
    }

    fn set_outcome(&mut self, outcome: Outcome, keys: Option<Vec<String>>) {
        self.outcome = Some(outcome);
        self.listed_keys = keys;
    }

    /// Apply one key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            return Flow::Quit;
        }

        if self.menu.is_some() {
            self.handle_menu_key(key.code);
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => {
                let line = self.input_value().to_string();
                self.submit(&line).await;
                if !line.trim().is_empty() {
                    self.history.push(line);
                }
                self.history_pos = None;
                self.set_input("");
            }
            KeyCode::Tab => self.menu = Some(0),
            KeyCode::Up => self.history_back(),
            KeyCode::Down => self.history_forward(),
            KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End => {
                self.input.input(Input::from(key));
            }
            KeyCode::Char(c) if !ctrl && !c.is_control() => {
                if self.input_value().chars().count() < CHAR_LIMIT {
                    self.input.insert_char(c);
                }
            }
            _ => {}
        }

        Flow::Continue
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let Some(selected) = self.menu else {
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Tab => self.menu = None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu = Some((selected + 1).min(KNOWN_VERBS.len() - 1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu = Some(selected.saturating_sub(1));
            }
            KeyCode::Enter => {
                let (verb, _, _) = KNOWN_VERBS[selected];
                self.set_input(&format!("{} ", verb));
                self.menu = None;
            }
            _ => {}
        }
    }

    /// Replace the input line, cursor at the end
    fn set_input(&mut self, value: &str) {
        let value: String = value.chars().take(CHAR_LIMIT).collect();
        let mut input = TextArea::new(vec![value]);
        input.move_cursor(CursorMove::End);
        self.input = input;
    }

    fn history_back(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            Some(pos) => pos.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_pos = Some(pos);
        let line = self.history[pos].clone();
        self.set_input(&line);
    }

    fn history_forward(&mut self) {
        match self.history_pos {
            Some(pos) if pos + 1 < self.history.len() => {
                self.history_pos = Some(pos + 1);
                let line = self.history[pos + 1].clone();
                self.set_input(&line);
            }
            Some(_) => {
                self.history_pos = None;
                self.set_input("");
            }
            None => {}
        }
    }
}

fn is_keys_listing(line: &str, text: &str) -> bool {
    let verb = line.split_whitespace().next().unwrap_or_default();
    verb.eq_ignore_ascii_case("KEYS") && text != commands::EMPTY_KEYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockStore};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_line(session: &mut Session, line: &str) {
        for c in line.chars() {
            session.handle_key(press(KeyCode::Char(c))).await;
        }
        session.handle_key(press(KeyCode::Enter)).await;
    }

    async fn connected(store: MemoryStore) -> Session {
        Session::with_store(Box::new(store)).await
    }

    #[tokio::test]
    async fn test_bootstrap_success() {
        let session = connected(MemoryStore::new()).await;
        assert!(session.is_connected());
        assert_eq!(session.outcome().unwrap().text(), CONNECTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_failed_probe_starts_disconnected() {
        let mut store = MockStore::new();
        store
            .expect_ping()
            .times(1)
            .returning(|| Err(RedisTuiError::StoreFailure("Connection refused".to_string())));

        let mut session = Session::with_store(Box::new(store)).await;
        assert!(!session.is_connected());
        assert!(session.outcome().unwrap().is_error());

        // No further expectations: any store call would panic.
        for line in ["GET a", "PING", "hgetall h", "SET k"] {
            session.submit(line).await;
            let outcome = session.outcome().unwrap();
            assert!(outcome.is_error());
            assert_eq!(outcome.text(), "not connected to Redis");
        }
    }

    #[tokio::test]
    async fn test_typed_command_runs_and_clears_input() {
        let mut session = connected(MemoryStore::new()).await;
        type_line(&mut session, "SET greeting hello world").await;
        assert_eq!(session.outcome().unwrap().text(), "OK");
        assert!(session.input_value().is_empty());

        type_line(&mut session, "get greeting").await;
        assert_eq!(session.outcome().unwrap().text(), "hello world");
        assert_eq!(session.history(), ["SET greeting hello world", "get greeting"]);
    }

    #[tokio::test]
    async fn test_blank_enter_keeps_outcome() {
        let mut session = connected(MemoryStore::with_entries([("a", "1")])).await;
        type_line(&mut session, "GET a").await;
        let before = session.outcome().cloned();

        type_line(&mut session, "   ").await;
        assert_eq!(session.outcome().cloned(), before);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_keep_session_alive() {
        let mut session = connected(MemoryStore::new()).await;
        type_line(&mut session, "SET onlykey").await;
        let outcome = session.outcome().unwrap();
        assert!(outcome.is_error());
        assert_eq!(outcome.text(), "SET requires at least 2 arguments");

        type_line(&mut session, "PING").await;
        assert_eq!(session.outcome().unwrap().text(), "PONG");
    }

    #[tokio::test]
    async fn test_store_failure_keeps_session_connected() {
        let mut store = MockStore::new();
        store.expect_ping().times(1).returning(|| Ok("PONG".to_string()));
        store
            .expect_get()
            .times(1)
            .returning(|_| Err(RedisTuiError::StoreFailure("connection reset".to_string())));
        store.expect_db_size().times(1).returning(|| Ok(3));

        let mut session = Session::with_store(Box::new(store)).await;
        assert!(session.is_connected());

        type_line(&mut session, "GET k").await;
        let outcome = session.outcome().unwrap();
        assert!(outcome.is_error());
        assert_eq!(outcome.text(), "connection reset");
        assert!(session.is_connected());

        type_line(&mut session, "DBSIZE").await;
        let outcome = session.outcome().unwrap();
        assert!(!outcome.is_error());
        assert_eq!(outcome.text(), "3 keys");
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut session = connected(MemoryStore::new()).await;
        assert_eq!(session.handle_key(press(KeyCode::Esc)).await, Flow::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(session.handle_key(ctrl_c).await, Flow::Quit);
        assert_eq!(
            session.handle_key(press(KeyCode::Char('c'))).await,
            Flow::Continue
        );
    }

    #[tokio::test]
    async fn test_editing_keys() {
        let mut session = connected(MemoryStore::new()).await;
        for c in "GET ky".chars() {
            session.handle_key(press(KeyCode::Char(c))).await;
        }
        session.handle_key(press(KeyCode::Left)).await;
        session.handle_key(press(KeyCode::Char('e'))).await;
        assert_eq!(session.input_value(), "GET key");

        session.handle_key(press(KeyCode::Home)).await;
        session.handle_key(press(KeyCode::Delete)).await;
        assert_eq!(session.input_value(), "ET key");
        session.handle_key(press(KeyCode::End)).await;
        session.handle_key(press(KeyCode::Backspace)).await;
        assert_eq!(session.input_value(), "ET ke");
        assert_eq!(session.input().cursor(), (0, 5));
    }

    #[tokio::test]
    async fn test_char_limit() {
        let mut session = connected(MemoryStore::new()).await;
        for _ in 0..CHAR_LIMIT + 10 {
            session.handle_key(press(KeyCode::Char('x'))).await;
        }
        assert_eq!(session.input_value().chars().count(), CHAR_LIMIT);

        // The cap counts characters, not bytes.
        let mut session = connected(MemoryStore::new()).await;
        for _ in 0..CHAR_LIMIT + 1 {
            session.handle_key(press(KeyCode::Char('日'))).await;
        }
        assert_eq!(session.input_value().chars().count(), CHAR_LIMIT);
    }

    #[tokio::test]
    async fn test_wide_characters_edit_by_char() {
        let mut session = connected(MemoryStore::new()).await;
        for c in "GET 日本".chars() {
            session.handle_key(press(KeyCode::Char(c))).await;
        }
        assert_eq!(session.input_value(), "GET 日本");
        assert_eq!(session.input().cursor(), (0, 6));

        session.handle_key(press(KeyCode::Left)).await;
        session.handle_key(press(KeyCode::Backspace)).await;
        assert_eq!(session.input_value(), "GET 本");
        assert_eq!(session.input().cursor(), (0, 4));
    }

    #[tokio::test]
    async fn test_ctrl_enter_variants_stay_single_line() {
        let mut session = connected(MemoryStore::new()).await;
        for c in "PING".chars() {
            session.handle_key(press(KeyCode::Char(c))).await;
        }
        for c in ['m', 'j'] {
            session
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
                .await;
        }
        assert_eq!(session.input().lines().len(), 1);
        assert_eq!(session.input_value(), "PING");
    }

    #[tokio::test]
    async fn test_history_navigation() {
        let mut session = connected(MemoryStore::new()).await;
        type_line(&mut session, "PING").await;
        type_line(&mut session, "DBSIZE").await;

        session.handle_key(press(KeyCode::Up)).await;
        assert_eq!(session.input_value(), "DBSIZE");
        session.handle_key(press(KeyCode::Up)).await;
        assert_eq!(session.input_value(), "PING");
        session.handle_key(press(KeyCode::Up)).await;
        assert_eq!(session.input_value(), "PING");
        session.handle_key(press(KeyCode::Down)).await;
        assert_eq!(session.input_value(), "DBSIZE");
        session.handle_key(press(KeyCode::Down)).await;
        assert!(session.input_value().is_empty());
    }

    #[tokio::test]
    async fn test_verb_menu_inserts_verb() {
        let mut session = connected(MemoryStore::new()).await;
        session.handle_key(press(KeyCode::Tab)).await;
        assert_eq!(session.menu_selection(), Some(0));

        session.handle_key(press(KeyCode::Down)).await;
        assert_eq!(session.handle_key(press(KeyCode::Enter)).await, Flow::Continue);
        assert_eq!(session.menu_selection(), None);
        assert_eq!(session.input_value(), "SET ");

        // Esc inside the menu closes it instead of quitting.
        session.handle_key(press(KeyCode::Tab)).await;
        assert_eq!(session.handle_key(press(KeyCode::Esc)).await, Flow::Continue);
        assert_eq!(session.menu_selection(), None);
    }

    #[tokio::test]
    async fn test_keys_listing_is_tracked() {
        let mut session = connected(MemoryStore::with_entries([("a", "1"), ("b", "2")])).await;
        type_line(&mut session, "KEYS *").await;
        assert_eq!(session.listed_keys().map(|k| k.len()), Some(2));

        type_line(&mut session, "GET a").await;
        assert_eq!(session.listed_keys(), None);

        type_line(&mut session, "KEYS none*").await;
        assert_eq!(session.listed_keys(), None);
    }
}
