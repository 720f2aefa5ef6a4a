//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use vitafit_core::chat::{ChatController, Sender};

use super::app::App;

/// Render the dashboard. Takes `&mut App` because the transcript layout
/// feeds the viewport its current dimensions.
pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // transcript
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_transcript(f, &mut app.chat, chunks[0]);
    render_input(f, &app.chat, chunks[1]);
    render_status_bar(f, &app.chat, chunks[2]);
}

fn render_transcript(f: &mut Frame, chat: &mut ChatController, area: Rect) {
    let inner_width = usize::from(area.width.saturating_sub(2)).max(1);
    let inner_height = u32::from(area.height.saturating_sub(2));

    let lines = transcript_lines(chat, inner_width);
    let viewport = chat.viewport_mut();
    viewport.set_viewport_height(inner_height);
    viewport.set_content_height(u32::try_from(lines.len()).unwrap_or(u32::MAX));
    let offset = u16::try_from(viewport.offset()).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Fitness coach "))
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn transcript_lines(chat: &ChatController, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in chat.history() {
        let (label, color) = match message.sender {
            Sender::User => ("You", Color::Cyan),
            Sender::Assistant => ("Coach", Color::Green),
        };
        let style = Style::default().fg(color);
        for row in wrap(&format!("{label}: {}", message.text), width) {
            lines.push(Line::from(Span::styled(row, style)));
        }
        lines.push(Line::default());
    }

    if let Some(placeholder) = chat.placeholder() {
        let style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        for row in wrap(placeholder, width) {
            lines.push(Line::from(Span::styled(row, style)));
        }
    }
    lines
}

fn render_input(f: &mut Frame, chat: &ChatController, area: Rect) {
    let enabled = chat.input_enabled();
    let title = if enabled { " Message " } else { " Please wait " };
    let style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(chat.input().to_string())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);

    if enabled {
        let typed = u16::try_from(chat.input().chars().count()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(typed)
            .min(area.right().saturating_sub(2));
        f.set_cursor_position((x, area.y + 1));
    }
}

fn render_status_bar(f: &mut Frame, chat: &ChatController, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", chat.session()),
        Style::default().bg(Color::Blue).fg(Color::White),
    )];

    if let Some(err) = chat.overview_error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.to_owned(), Style::default().fg(Color::Red)));
    }

    if chat.viewport().has_new_message() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "New message (End)",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::raw("  Enter:send  PgUp/PgDn:scroll  End:latest  Esc:quit"));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// -- Helpers --

/// Hard-wrap `text` to rows of at most `width` characters. Each source line
/// yields at least one row.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
    }
    rows
}
