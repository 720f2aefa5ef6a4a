//! Conversational session controller: the one-per-session overview followed
//! by free-form chat, plus the scroll policy for the message history.
//!
//! Like the planner, each request is a `begin_*` that returns a [`Ticket`]
//! and the request body, and a `finish_*` that applies the outcome only if
//! the ticket is still current.

pub mod viewport;

use std::fmt;

use crate::api::{ApiError, Backend, ChatRequest};
use crate::session::SessionId;
use crate::stage::{Completion, Stage, StageState, Ticket};

pub use viewport::{DEFAULT_PROXIMITY_THRESHOLD, ScrollDecision, Viewport};

pub const OVERVIEW_PLACEHOLDER: &str = "Loading your health overview...";
pub const WELCOME_PLACEHOLDER: &str =
    "Hi there! Ask me anything about fitness or nutrition based on your plan.";
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Used when a failure carries no usable error body.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewStatus {
    NotStarted,
    Loading,
    Ready,
    Failed,
}

/// Text for an error shown to the user: the server's rendered `detail`, or
/// [`UNKNOWN_ERROR`]. Client-side transport and decode text is only logged.
fn error_text(err: &ApiError) -> String {
    err.detail()
        .filter(|detail| !detail.trim().is_empty())
        .map_or_else(|| UNKNOWN_ERROR.to_owned(), str::to_owned)
}

/// Owned chat state for one session.
#[derive(Debug)]
pub struct ChatController {
    session: SessionId,
    history: Vec<ChatMessage>,
    input: String,
    overview: StageState,
    overview_status: OverviewStatus,
    send: StageState,
    viewport: Viewport,
}

impl ChatController {
    pub fn new(session: SessionId) -> Self {
        Self::with_viewport(session, Viewport::new())
    }

    pub fn with_viewport(session: SessionId, viewport: Viewport) -> Self {
        Self {
            session,
            history: Vec::new(),
            input: String::new(),
            overview: StageState::new(Stage::Overview),
            overview_status: OverviewStatus::NotStarted,
            send: StageState::new(Stage::Chat),
            viewport,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn overview_status(&self) -> OverviewStatus {
        self.overview_status
    }

    /// Error from the overview request, for its dedicated affordance.
    pub fn overview_error(&self) -> Option<&str> {
        self.overview.error()
    }

    pub fn is_sending(&self) -> bool {
        self.send.is_loading()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    // -- Input --

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    /// Input is disabled while the overview is loading or a send is in
    /// flight. An overview failure does not disable it.
    pub fn input_enabled(&self) -> bool {
        !matches!(
            self.overview_status,
            OverviewStatus::NotStarted | OverviewStatus::Loading
        ) && !self.send.is_loading()
    }

    /// The placeholder the surface should show in place of (or after) the
    /// history, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.overview_status {
            OverviewStatus::NotStarted | OverviewStatus::Loading => Some(OVERVIEW_PLACEHOLDER),
            _ if self.send.is_loading() => Some(THINKING_PLACEHOLDER),
            _ if self.history.is_empty() && self.overview.error().is_none() => {
                Some(WELCOME_PLACEHOLDER)
            }
            _ => None,
        }
    }

    /// Push a message, letting the viewport decide whether to follow it.
    /// The decision is visible through [`Viewport::has_new_message`].
    fn append(&mut self, message: ChatMessage) {
        self.viewport.history_changed();
        self.history.push(message);
    }

    // -- Overview --

    /// Start the overview request. Returns `None` if it was already issued
    /// for this controller.
    pub fn begin_overview(&mut self) -> Option<(Ticket, ChatRequest)> {
        if self.overview_status != OverviewStatus::NotStarted {
            return None;
        }
        let ticket = self.overview.begin()?;
        self.overview_status = OverviewStatus::Loading;
        tracing::info!(session_id = %self.session, stage = %Stage::Overview, "requesting overview");
        Some((ticket, ChatRequest::overview(self.session)))
    }

    /// Seed the history with the overview (or its failure).
    pub fn finish_overview(&mut self, ticket: Ticket, result: Result<String, ApiError>) -> Completion {
        let detail = result.as_ref().err().map(error_text);
        let error = detail
            .as_ref()
            .map(|detail| format!("Error getting health overview: {detail}"));
        let completion = self.overview.finish(&ticket, error);
        if !completion.is_applied() {
            tracing::debug!(session_id = %self.session, stage = %Stage::Overview, "discarding stale response");
            return completion;
        }

        match result {
            Ok(text) => {
                self.overview_status = OverviewStatus::Ready;
                self.history.clear();
                self.append(ChatMessage::assistant(text));
            }
            Err(err) => {
                let detail = detail.unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
                tracing::warn!(session_id = %self.session, error = %err, "overview request failed");
                self.overview_status = OverviewStatus::Failed;
                self.history.clear();
                self.append(ChatMessage::assistant(format!(
                    "Failed to load initial overview: {detail}"
                )));
            }
        }
        completion
    }

    // -- Chat --

    /// Take the current input as a user message and start sending it.
    ///
    /// Returns `None` without side effects when the trimmed input is empty,
    /// a send is already in flight, or the overview has not finished.
    pub fn begin_send(&mut self) -> Option<(Ticket, ChatRequest)> {
        let text = self.input.trim();
        if text.is_empty() || !self.input_enabled() {
            return None;
        }
        let text = text.to_owned();
        let ticket = self.send.begin()?;

        self.input.clear();
        self.append(ChatMessage::user(text.clone()));
        tracing::debug!(session_id = %self.session, chars = text.len(), "sending chat message");
        Some((
            ticket,
            ChatRequest {
                session_id: self.session,
                message: text,
            },
        ))
    }

    /// Append the assistant's reply, or an error-flavored assistant message.
    /// The user's message is never rolled back.
    pub fn finish_send(&mut self, ticket: Ticket, result: Result<String, ApiError>) -> Completion {
        let completion = self.send.finish(&ticket, None);
        if !completion.is_applied() {
            tracing::debug!(session_id = %self.session, stage = %Stage::Chat, "discarding stale response");
            return completion;
        }

        let message = match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(session_id = %self.session, error = %err, "chat request failed");
                format!("Error: {}", error_text(&err))
            }
        };
        self.append(ChatMessage::assistant(message));
        completion
    }

    // -- Drivers --

    /// Issue the overview request if it has not been issued yet.
    pub async fn load_overview(&mut self, backend: &dyn Backend) -> Option<Completion> {
        let (ticket, req) = self.begin_overview()?;
        let result = backend.overview(&req).await;
        Some(self.finish_overview(ticket, result))
    }

    /// Send the current input. `None` means nothing was sent.
    pub async fn send(&mut self, backend: &dyn Backend) -> Option<Completion> {
        let (ticket, req) = self.begin_send()?;
        let result = backend.chat(&req).await;
        Some(self.finish_send(ticket, result))
    }
}
