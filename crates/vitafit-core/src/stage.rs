//! Per-stage request bookkeeping shared by the planner and the chat
//! controller: an in-flight flag, an error slot, and a generation counter
//! that lets late responses be recognized and discarded.

use std::fmt;

/// One discrete backend interaction with its own loading/error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Exercise,
    Diet,
    Report,
    Overview,
    Chat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exercise => "exercise",
            Self::Diet => "diet",
            Self::Report => "report",
            Self::Overview => "overview",
            Self::Chat => "chat",
        };
        f.write_str(s)
    }
}

/// Handle for one in-flight request, returned when a stage begins and
/// handed back when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    stage: Stage,
    generation: u64,
}

impl Ticket {
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// Whether a completed response was applied to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket no longer matches the stage (it was reset or restarted);
    /// the response was dropped.
    Stale,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Loading flag, error slot and generation for one stage.
#[derive(Debug, Clone)]
pub struct StageState {
    stage: Stage,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl StageState {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark the stage in flight. Returns `None` if a request is already
    /// pending, which is how duplicate submissions are suppressed.
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.loading {
            return None;
        }
        self.generation += 1;
        self.loading = true;
        self.error = None;
        Some(Ticket {
            stage: self.stage,
            generation: self.generation,
        })
    }

    /// Whether `ticket` belongs to the request currently in flight.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.loading && ticket.stage == self.stage && ticket.generation == self.generation
    }

    /// Release the loading flag and record the outcome's error text.
    ///
    /// Runs for success and failure alike. A stale ticket changes nothing.
    pub fn finish(&mut self, ticket: &Ticket, error: Option<String>) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Stale;
        }
        self.loading = false;
        self.error = error;
        Completion::Applied
    }

    /// Record an error that never reached the network (e.g. validation).
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Forget any in-flight request so its response will be treated as
    /// stale, and clear the stage.
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_exclusive_until_finished() {
        let mut state = StageState::new(Stage::Diet);
        let ticket = state.begin().expect("first begin");
        assert!(state.is_loading());
        assert!(state.begin().is_none(), "second begin must be refused");

        assert_eq!(state.finish(&ticket, None), Completion::Applied);
        assert!(!state.is_loading());
        assert!(state.begin().is_some());
    }

    #[test]
    fn finish_records_error_and_releases_loading() {
        let mut state = StageState::new(Stage::Exercise);
        let ticket = state.begin().unwrap();
        state.finish(&ticket, Some("boom".into()));
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("boom"));

        // The next attempt starts clean.
        let _ticket = state.begin().unwrap();
        assert_eq!(state.error(), None);
    }

    #[test]
    fn abandoned_ticket_is_stale() {
        let mut state = StageState::new(Stage::Report);
        let old = state.begin().unwrap();
        state.abandon();
        assert!(!state.is_loading());

        let new = state.begin().unwrap();
        assert_eq!(state.finish(&old, Some("late".into())), Completion::Stale);
        assert!(state.is_loading(), "stale completion must not release the new request");
        assert_eq!(state.error(), None);
        assert_eq!(state.finish(&new, None), Completion::Applied);
    }

    #[test]
    fn ticket_cannot_be_applied_twice() {
        let mut state = StageState::new(Stage::Chat);
        let ticket = state.begin().unwrap();
        assert!(state.finish(&ticket, None).is_applied());
        assert_eq!(state.finish(&ticket, Some("dup".into())), Completion::Stale);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn ticket_from_other_stage_is_rejected() {
        let mut diet = StageState::new(Stage::Diet);
        let mut report = StageState::new(Stage::Report);
        let report_ticket = report.begin().unwrap();
        let _diet_ticket = diet.begin().unwrap();
        assert_eq!(diet.finish(&report_ticket, None), Completion::Stale);
        assert!(diet.is_loading());
    }
}
