//! Terminal loop
//!
//! This module owns the terminal: it draws the session, reads one key
//! event at a time and hands it to the session until the user quits.

use crate::cli::session::{Flow, Session};
use crate::cli::view;
use crate::error::{RedisTuiError, Result};
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::time::Duration;

/// How long to wait for input before letting background tasks run
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Interactive terminal loop around a `Session`
pub struct Repl {
    /// The session being displayed
    session: Session,
}

impl Repl {
    /// Create a new loop around `session`
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Take over the terminal and run until the user quits.
    ///
    /// The terminal is restored on every exit path.
    pub async fn run(mut self) -> Result<()> {
        let mut terminal =
            ratatui::try_init().map_err(|e| RedisTuiError::Terminal(e.to_string()))?;

        let result = self.event_loop(&mut terminal).await;

        ratatui::restore();
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal
                .draw(|f| view::draw(f, &self.session))
                .map_err(|e| RedisTuiError::Terminal(e.to_string()))?;

            // The Redis connection driver shares this thread.
            if !event::poll(POLL_INTERVAL)? {
                tokio::task::yield_now().await;
                continue;
            }

            if let Event::Key(key) = event::read()? {
                if self.session.handle_key(key).await == Flow::Quit {
                    tracing::info!("quit requested");
                    return Ok(());
                }
            }
        }
    }
}
