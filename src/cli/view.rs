//! Session view
//!
//! Draws a `Session` with ratatui. All colors and layout live here; the
//! session exposes its text input unstyled and everything else as plain
//! text and flags.

use crate::cli::commands::KNOWN_VERBS;
use crate::cli::session::Session;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const PLACEHOLDER: &str = "Enter Redis command (e.g., SET key value, GET key)";

fn title_style() -> Style {
    Style::default()
        .fg(Color::Indexed(205))
        .add_modifier(Modifier::BOLD)
}

fn input_style() -> Style {
    Style::default().fg(Color::Indexed(86))
}

fn result_style() -> Style {
    Style::default().fg(Color::Indexed(241))
}

fn error_style() -> Style {
    Style::default()
        .fg(Color::Indexed(196))
        .add_modifier(Modifier::BOLD)
}

fn help_style() -> Style {
    Style::default()
        .fg(Color::Indexed(241))
        .add_modifier(Modifier::ITALIC)
}

/// Draw the whole screen
pub fn draw(f: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(2), // Connection status
            Constraint::Length(3), // Input
            Constraint::Min(3),    // Result or error
            Constraint::Length(2), // Help
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(Span::styled("● Redis TUI", title_style()))),
        chunks[0],
    );

    let mut status = vec![if session.is_connected() {
        Span::styled("● Connected", input_style())
    } else {
        Span::styled("● Disconnected", error_style())
    }];
    if let Some(address) = session.address() {
        status.push(Span::styled(format!("  {}", address), result_style()));
    }
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    draw_input(f, session, chunks[2]);
    draw_outcome(f, session, chunks[3]);

    let help = Paragraph::new(vec![
        Line::from("Enter: Execute | Tab: Commands | ↑/↓: History | Esc/Ctrl+C: Quit"),
        Line::from("Examples: GET mykey | SET mykey myvalue | KEYS * | PING"),
    ])
    .style(help_style());
    f.render_widget(help, chunks[4]);

    if let Some(selected) = session.menu_selection() {
        draw_menu(f, selected);
    }
}

fn draw_input(f: &mut Frame, session: &Session, area: Rect) {
    let mut input = session.input().clone();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style())
            .title(Span::styled(" Command ", input_style())),
    );
    input.set_style(input_style());
    input.set_cursor_line_style(Style::default());
    input.set_placeholder_text(PLACEHOLDER);
    input.set_placeholder_style(result_style());
    if session.menu_selection().is_some() {
        input.set_cursor_style(input_style());
    }
    f.render_widget(&input, area);
}

fn draw_outcome(f: &mut Frame, session: &Session, area: Rect) {
    let Some(outcome) = session.outcome() else {
        return;
    };

    let stamp = outcome.at().format("%H:%M:%S");
    if outcome.is_error() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(error_style())
            .title(format!(" Error · {} ", stamp));
        let paragraph = Paragraph::new(format!("Error: {}", outcome.text()))
            .style(error_style())
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(result_style())
        .title(format!(" Result · {} ", stamp));

    if let Some(keys) = session.listed_keys() {
        let rows = block.inner(area).height as usize;
        let shown = if keys.len() > rows {
            rows.saturating_sub(1)
        } else {
            keys.len()
        };

        let mut items: Vec<ListItem> = keys
            .iter()
            .take(shown)
            .enumerate()
            .map(|(i, key)| ListItem::new(format!("{:2}. {}", i + 1, key)).style(key_row_style(i)))
            .collect();
        if shown < keys.len() {
            items.push(
                ListItem::new(format!("… and {} more", keys.len() - shown)).style(help_style()),
            );
        }
        f.render_widget(List::new(items).block(block), area);
        return;
    }

    let paragraph = Paragraph::new(outcome.text().to_string())
        .style(result_style())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Alternating row colors for key listings
fn key_row_style(row: usize) -> Style {
    if row % 2 == 0 {
        Style::default()
            .fg(Color::Rgb(0x00, 0xE6, 0x76))
            .bg(Color::Rgb(0x1E, 0x1E, 0x1E))
    } else {
        Style::default()
            .fg(Color::Rgb(0x80, 0xCB, 0xC4))
            .bg(Color::Rgb(0x12, 0x12, 0x12))
    }
}

fn draw_menu(f: &mut Frame, selected: usize) {
    let area = centered(f.area(), 60, KNOWN_VERBS.len() as u16 + 4);
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let items: Vec<ListItem> = KNOWN_VERBS
        .iter()
        .map(|(verb, arity, example)| {
            ListItem::new(format!("  {:8} {:22} {}", verb, arity.to_string(), example))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Commands "),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Black)
                .bg(Color::Cyan),
        );

    let mut state = ListState::default();
    state.select(Some(selected));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let help = Paragraph::new(" ↑/k: Up  ↓/j: Down  Enter: Select  Esc/Tab: Close ")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;

    fn render_buffer(session: &Session) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal.draw(|f| draw(f, session)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn render(session: &Session) -> String {
        render_buffer(session)
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn run(session: &mut Session, line: &str) {
        for c in line.chars() {
            session
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .await;
        }
        session
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .await;
    }

    #[tokio::test]
    async fn test_connected_screen() {
        let session = Session::with_store(Box::new(MemoryStore::new())).await;
        let screen = render(&session);
        assert!(screen.contains("Connected"));
        assert!(!screen.contains("Disconnected"));
        assert!(screen.contains("Enter Redis command"));
        assert!(screen.contains("Connected to Redis!"));
    }

    #[tokio::test]
    async fn test_error_and_keys_rendering() {
        let mut session =
            Session::with_store(Box::new(MemoryStore::with_entries([("alpha", "1")]))).await;

        run(&mut session, "GET").await;
        assert!(render(&session).contains("Error: GET requires exactly 1 argument"));

        run(&mut session, "KEYS *").await;
        assert!(render(&session).contains(" 1. alpha"));
    }

    #[tokio::test]
    async fn test_long_key_listing_reports_overflow() {
        let names: Vec<String> = (0..30).map(|i| format!("key{:02}", i)).collect();
        let mut session = Session::with_store(Box::new(MemoryStore::with_entries(
            names.iter().map(|name| (name.as_str(), "v")),
        )))
        .await;

        run(&mut session, "KEYS *").await;
        let screen = render(&session);
        assert!(screen.contains(" 1. key00"));
        assert!(!screen.contains("key29"));
        assert!(screen.contains("… and 20 more"));
    }

    #[tokio::test]
    async fn test_wide_characters_keep_cursor_aligned() {
        let mut session = Session::with_store(Box::new(MemoryStore::new())).await;
        for c in "GET 日本".chars() {
            session
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .await;
        }

        let buffer = render_buffer(&session);
        // Input text starts inside the margin and the border, at x = 2.
        let row = (0..buffer.area.height)
            .find(|&y| buffer[(2, y)].symbol() == "G")
            .unwrap();
        assert_eq!(buffer[(6, row)].symbol(), "日");
        assert_eq!(buffer[(8, row)].symbol(), "本");
        assert!(buffer[(10, row)].modifier.contains(Modifier::REVERSED));
    }

    #[tokio::test]
    async fn test_menu_overlay() {
        let mut session = Session::with_store(Box::new(MemoryStore::new())).await;
        session
            .handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE))
            .await;
        let screen = render(&session);
        assert!(screen.contains("Esc/Tab: Close"));
        assert!(screen.contains("FLUSHDB"));
    }

    #[test]
    fn test_centered_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(area, 60, 20), area);
        assert_eq!(centered(area, 20, 4), Rect::new(10, 3, 20, 4));
    }
}
