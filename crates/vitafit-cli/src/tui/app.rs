//! TUI application state for the chat dashboard.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use vitafit_core::api::{ApiError, Backend, ChatRequest};
use vitafit_core::chat::ChatController;
use vitafit_core::stage::Ticket;

/// A backend call the event loop should run off the UI thread.
#[derive(Debug)]
pub enum Request {
    Overview(Ticket, ChatRequest),
    Send(Ticket, ChatRequest),
}

impl Request {
    pub async fn run(self, backend: &dyn Backend) -> Outcome {
        match self {
            Self::Overview(ticket, req) => Outcome::Overview(ticket, backend.overview(&req).await),
            Self::Send(ticket, req) => Outcome::Reply(ticket, backend.chat(&req).await),
        }
    }
}

/// A finished backend call, delivered back over the result channel.
#[derive(Debug)]
pub enum Outcome {
    Overview(Ticket, Result<String, ApiError>),
    Reply(Ticket, Result<String, ApiError>),
}

/// Application state for the TUI.
pub struct App {
    pub chat: ChatController,
    pub tick_rate: Duration,
    pub should_quit: bool,
}

impl App {
    pub fn new(chat: ChatController) -> Self {
        Self {
            chat,
            tick_rate: Duration::from_millis(100),
            should_quit: false,
        }
    }

    /// The overview request, if it has not been issued yet.
    pub fn start(&mut self) -> Option<Request> {
        self.chat
            .begin_overview()
            .map(|(ticket, req)| Request::Overview(ticket, req))
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Overview(ticket, result) => {
                self.chat.finish_overview(ticket, result);
            }
            Outcome::Reply(ticket, result) => {
                self.chat.finish_send(ticket, result);
            }
        }
    }

    /// Rows moved by PageUp/PageDown.
    fn page(&self) -> i64 {
        i64::from(self.chat.viewport().height().max(1))
    }

    /// Handle one key press. Returns a request when the key sent a message.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                return self
                    .chat
                    .begin_send()
                    .map(|(ticket, req)| Request::Send(ticket, req));
            }
            KeyCode::Backspace => {
                if self.chat.input_enabled() {
                    self.chat.pop_input();
                }
            }
            KeyCode::Char(c) => {
                if self.chat.input_enabled() {
                    self.chat.push_input(c);
                }
            }
            KeyCode::Up => self.chat.viewport_mut().scroll_by(-1),
            KeyCode::Down => self.chat.viewport_mut().scroll_by(1),
            KeyCode::PageUp => {
                let page = self.page();
                self.chat.viewport_mut().scroll_by(-page);
            }
            KeyCode::PageDown => {
                let page = self.page();
                self.chat.viewport_mut().scroll_by(page);
            }
            KeyCode::End | KeyCode::Tab => self.chat.viewport_mut().jump_to_bottom(),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use vitafit_core::chat::{ChatMessage, Viewport};
    use vitafit_core::session::SessionId;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn ready_app() -> App {
        let mut app = App::new(ChatController::with_viewport(
            SessionId::generate(),
            Viewport::with_threshold(3),
        ));
        let Some(Request::Overview(ticket, _)) = app.start() else {
            panic!("expected overview request");
        };
        app.apply(Outcome::Overview(ticket, Ok("Overview text".into())));
        app
    }

    #[test]
    fn overview_is_requested_once() {
        let mut app = App::new(ChatController::new(SessionId::generate()));
        assert!(matches!(app.start(), Some(Request::Overview(..))));
        assert!(app.start().is_none());
    }

    #[test]
    fn typing_is_ignored_while_overview_loads() {
        let mut app = App::new(ChatController::new(SessionId::generate()));
        app.start();
        type_text(&mut app, "hi");
        assert_eq!(app.chat.input(), "");
        assert!(app.handle_key(press(KeyCode::Enter)).is_none());
    }

    #[test]
    fn enter_sends_trimmed_input() {
        let mut app = ready_app();
        type_text(&mut app, " more fiber? ");
        let Some(Request::Send(ticket, req)) = app.handle_key(press(KeyCode::Enter)) else {
            panic!("expected send request");
        };
        assert_eq!(req.message, "more fiber?");
        assert_eq!(app.chat.input(), "");

        app.apply(Outcome::Reply(ticket, Ok("Yes.".into())));
        assert_eq!(app.chat.history().last(), Some(&ChatMessage::assistant("Yes.")));
    }

    #[test]
    fn backspace_edits_input() {
        let mut app = ready_app();
        type_text(&mut app, "abc");
        app.handle_key(press(KeyCode::Backspace));
        assert_eq!(app.chat.input(), "ab");
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut app = ready_app();
        app.handle_key(press(KeyCode::Esc));
        assert!(app.should_quit);

        let mut app = ready_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.chat.input(), "");
    }

    #[test]
    fn end_invokes_new_message_indicator() {
        let mut app = ready_app();
        let viewport = app.chat.viewport_mut();
        viewport.set_viewport_height(5);
        viewport.set_content_height(40);
        app.handle_key(press(KeyCode::PageUp));
        app.handle_key(press(KeyCode::PageUp));
        assert_eq!(app.chat.viewport().offset(), 25);

        type_text(&mut app, "q");
        let Some(Request::Send(ticket, _)) = app.handle_key(press(KeyCode::Enter)) else {
            panic!("expected send request");
        };
        app.apply(Outcome::Reply(ticket, Ok("a".into())));
        assert!(app.chat.viewport().has_new_message());

        app.handle_key(press(KeyCode::End));
        assert!(!app.chat.viewport().has_new_message());
    }
}
