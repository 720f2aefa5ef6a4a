//! Planning orchestrator: the exercise -> diet -> report workflow for one
//! session.
//!
//! State lives in an owned [`Planner`]; every stage is split into a
//! synchronous `begin_*` (guards, builds the request, returns a [`Ticket`])
//! and `finish_*` (applies the response if the ticket is still current).
//! The async `submit` / `request_diet` / `download_report` helpers chain the
//! two around a [`Backend`] call. Callers that want several stages in flight
//! at once drive `begin_*`/`finish_*` themselves.
//!
//! ```text
//! Unsubmitted --exercise ok--> Submitted --diet ok--> SubmittedWithDiet
//!      ^                           |                         |
//!      +---------- reset ----------+-------------------------+
//! ```
//!
//! Report download is available in both submitted states.

pub mod report;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::{
    ApiError, Backend, DietPlan, DietRequest, ExercisePlan, ExerciseRequest, ReportRequest,
    UserDetails,
};
use crate::chat::ChatController;
use crate::form::{FormError, FormField, FormRecord};
use crate::session::SessionId;
use crate::stage::{Completion, Stage, StageState, Ticket};
use crate::validate::{ValidationError, validate};

pub use report::{DirectorySink, ReportError, ReportSink};

/// Shown when the exercise call fails without a usable error body.
pub const EXERCISE_FALLBACK_ERROR: &str = "Failed to get exercise plan. Please check your inputs.";
/// Shown when the diet call fails without a usable error body.
pub const DIET_FALLBACK_ERROR: &str = "Failed to get diet plan. Please try again.";

/// Where the workflow is. Derived from stored plans, never stored itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Unsubmitted,
    Submitted,
    SubmittedWithDiet,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unsubmitted => "unsubmitted",
            Self::Submitted => "submitted",
            Self::SubmittedWithDiet => "submitted_with_diet",
        };
        f.write_str(s)
    }
}

/// Why a stage could not be started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageBlocked {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0} request already in flight")]
    InFlight(Stage),

    #[error("{0} is not available until an exercise plan has been produced")]
    Locked(Stage),
}

/// Owned state of one planning workflow.
#[derive(Debug)]
pub struct Planner {
    session: SessionId,
    form: FormRecord,
    exercise: StageState,
    exercise_plan: Option<ExercisePlan>,
    diet: StageState,
    diet_plan: Option<DietPlan>,
    report: StageState,
    last_report: Option<PathBuf>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Start a workflow with a fresh session token.
    pub fn new() -> Self {
        Self::with_session(SessionId::generate())
    }

    /// Start a workflow bound to an existing session token.
    pub fn with_session(session: SessionId) -> Self {
        tracing::debug!(session_id = %session, "planner created");
        Self {
            session,
            form: FormRecord::new(),
            exercise: StageState::new(Stage::Exercise),
            exercise_plan: None,
            diet: StageState::new(Stage::Diet),
            diet_plan: None,
            report: StageState::new(Stage::Report),
            last_report: None,
        }
    }

    // -- Accessors --

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn form(&self) -> &FormRecord {
        &self.form
    }

    pub fn exercise_status(&self) -> &StageState {
        &self.exercise
    }

    pub fn diet_status(&self) -> &StageState {
        &self.diet
    }

    pub fn report_status(&self) -> &StageState {
        &self.report
    }

    pub fn exercise_plan(&self) -> Option<&ExercisePlan> {
        self.exercise_plan.as_ref()
    }

    pub fn diet_plan(&self) -> Option<&DietPlan> {
        self.diet_plan.as_ref()
    }

    /// Where the most recent report was saved.
    pub fn last_report(&self) -> Option<&Path> {
        self.last_report.as_deref()
    }

    pub fn workflow_stage(&self) -> WorkflowStage {
        match (&self.exercise_plan, &self.diet_plan) {
            (None, _) => WorkflowStage::Unsubmitted,
            (Some(_), None) => WorkflowStage::Submitted,
            (Some(_), Some(_)) => WorkflowStage::SubmittedWithDiet,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.exercise_plan.is_some()
    }

    /// Whether the "request diet plan" affordance should be offered.
    pub fn can_request_diet(&self) -> bool {
        self.is_submitted() && self.diet_plan.is_none() && !self.diet.is_loading()
    }

    /// Whether the report download affordance should be offered.
    pub fn can_download_report(&self) -> bool {
        self.is_submitted() && !self.report.is_loading()
    }

    // -- Form --

    /// Update one form field (BMI is re-derived when relevant).
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        self.form.set(field, value)
    }

    pub fn form_mut(&mut self) -> &mut FormRecord {
        &mut self.form
    }

    /// Open the chat surface for this session. Only available once the
    /// exercise stage has succeeded.
    pub fn open_chat(&self) -> Option<ChatController> {
        self.is_submitted().then(|| ChatController::new(self.session))
    }

    /// Return to the unsubmitted form. Plans are cleared and every in-flight
    /// response will be discarded when it arrives. The session is kept.
    pub fn reset(&mut self) {
        tracing::info!(session_id = %self.session, "workflow reset");
        self.exercise.abandon();
        self.diet.abandon();
        self.report.abandon();
        self.exercise_plan = None;
        self.diet_plan = None;
    }

    // -- Stage E: exercise plan --

    /// Validate the form and start the exercise request.
    ///
    /// A validation failure is recorded as the exercise error and never
    /// reaches the network.
    pub fn begin_exercise(&mut self) -> Result<(Ticket, ExerciseRequest), StageBlocked> {
        if self.exercise.is_loading() {
            return Err(StageBlocked::InFlight(Stage::Exercise));
        }

        let input = match validate(&self.form) {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!(session_id = %self.session, error = %err, "form rejected");
                self.exercise.set_error(err.to_string());
                return Err(err.into());
            }
        };

        let ticket = self
            .exercise
            .begin()
            .ok_or(StageBlocked::InFlight(Stage::Exercise))?;
        // A new submission clears the diet stage's error slot as well.
        self.diet.clear_error();

        tracing::info!(session_id = %self.session, stage = %Stage::Exercise, "requesting exercise plan");
        Ok((ticket, ExerciseRequest::new(self.session, &input)))
    }

    pub fn finish_exercise(
        &mut self,
        ticket: Ticket,
        result: Result<ExercisePlan, ApiError>,
    ) -> Completion {
        let error = result.as_ref().err().map(|e| e.message_or(EXERCISE_FALLBACK_ERROR));
        let completion = self.exercise.finish(&ticket, error);
        if !completion.is_applied() {
            tracing::debug!(session_id = %self.session, stage = %Stage::Exercise, "discarding stale response");
            return completion;
        }

        match result {
            Ok(plan) => {
                tracing::info!(
                    session_id = %self.session,
                    exercise_type = %plan.exercise_type,
                    "exercise plan received"
                );
                self.exercise_plan = Some(plan);
                // A diet plan belongs to the previous exercise plan.
                self.diet.abandon();
                self.diet_plan = None;
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session, error = %err, "exercise plan request failed");
            }
        }
        completion
    }

    // -- Stage D: diet plan --

    pub fn begin_diet(&mut self) -> Result<(Ticket, DietRequest), StageBlocked> {
        if !self.is_submitted() {
            return Err(StageBlocked::Locked(Stage::Diet));
        }
        let ticket = self.diet.begin().ok_or(StageBlocked::InFlight(Stage::Diet))?;

        tracing::info!(session_id = %self.session, stage = %Stage::Diet, "requesting diet plan");
        Ok((
            ticket,
            DietRequest {
                session_id: self.session,
            },
        ))
    }

    pub fn finish_diet(&mut self, ticket: Ticket, result: Result<DietPlan, ApiError>) -> Completion {
        let error = result.as_ref().err().map(|e| e.message_or(DIET_FALLBACK_ERROR));
        let completion = self.diet.finish(&ticket, error);
        if !completion.is_applied() {
            tracing::debug!(session_id = %self.session, stage = %Stage::Diet, "discarding stale response");
            return completion;
        }

        match result {
            Ok(plan) => {
                tracing::info!(
                    session_id = %self.session,
                    declined = plan.is_declined(),
                    "diet plan received"
                );
                self.diet_plan = Some(plan);
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session, error = %err, "diet plan request failed");
            }
        }
        completion
    }

    // -- Stage R: report --

    pub fn begin_report(&mut self) -> Result<(Ticket, ReportRequest), StageBlocked> {
        if !self.is_submitted() {
            return Err(StageBlocked::Locked(Stage::Report));
        }
        let ticket = self
            .report
            .begin()
            .ok_or(StageBlocked::InFlight(Stage::Report))?;

        let user_details = UserDetails::from_full_name(
            self.form.name(),
            self.form.email().trim(),
            self.form.mobile().trim(),
        );
        tracing::info!(session_id = %self.session, stage = %Stage::Report, "requesting report");
        Ok((
            ticket,
            ReportRequest {
                session_id: self.session,
                user_details,
            },
        ))
    }

    /// Record the outcome of a report download. Failures become an
    /// alert-level message in the report error slot; nothing else changes.
    pub fn finish_report(
        &mut self,
        ticket: Ticket,
        result: Result<PathBuf, ReportError>,
    ) -> Completion {
        let error = result.as_ref().err().map(ReportError::alert);
        let completion = self.report.finish(&ticket, error);
        if !completion.is_applied() {
            tracing::debug!(session_id = %self.session, stage = %Stage::Report, "discarding stale response");
            return completion;
        }

        match result {
            Ok(path) => {
                tracing::info!(session_id = %self.session, path = %path.display(), "report saved");
                self.last_report = Some(path);
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session, error = %err, "report download failed");
            }
        }
        completion
    }

    // -- Drivers --

    /// Validate, request the exercise plan and apply the response.
    pub async fn submit(&mut self, backend: &dyn Backend) -> Result<Completion, StageBlocked> {
        let (ticket, req) = self.begin_exercise()?;
        let result = backend.predict_exercise(&req).await;
        Ok(self.finish_exercise(ticket, result))
    }

    /// Request the diet plan and apply the response.
    pub async fn request_diet(&mut self, backend: &dyn Backend) -> Result<Completion, StageBlocked> {
        let (ticket, req) = self.begin_diet()?;
        let result = backend.predict_diet(&req).await;
        Ok(self.finish_diet(ticket, result))
    }

    /// Download the report and hand it to `sink`.
    pub async fn download_report(
        &mut self,
        backend: &dyn Backend,
        sink: &dyn ReportSink,
    ) -> Result<Completion, StageBlocked> {
        let (ticket, req) = self.begin_report()?;
        let result = report::fetch_and_save(backend, sink, &req).await;
        Ok(self.finish_report(ticket, result))
    }
}
