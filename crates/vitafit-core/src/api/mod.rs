//! The planning backend's request/response contract.
//!
//! [`Backend`] is the seam between the workflow state machines and the
//! network. [`HttpBackend`] implements it over JSON-over-HTTP; tests plug in
//! scripted implementations.

pub mod error;
pub mod http;
pub mod types;

use async_trait::async_trait;

pub use error::ApiError;
pub use http::HttpBackend;
pub use types::{
    ChatRequest, DietPlan, DietRequest, DietTargets, ExercisePlan, ExerciseRequest,
    ReportDocument, ReportRequest, UserDetails,
};

/// Client interface for the five backend calls a workflow makes.
///
/// Object-safe so it can be shared as `Arc<dyn Backend>` between the
/// planner, the chat controller and spawned request tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /predict_exercise`
    async fn predict_exercise(&self, req: &ExerciseRequest) -> Result<ExercisePlan, ApiError>;

    /// `POST /predict_diet`
    async fn predict_diet(&self, req: &DietRequest) -> Result<DietPlan, ApiError>;

    /// `POST /generate_report`; the body is an opaque binary document.
    async fn generate_report(&self, req: &ReportRequest) -> Result<ReportDocument, ApiError>;

    /// `POST /ai/overview`; returns the assistant's text.
    async fn overview(&self, req: &ChatRequest) -> Result<String, ApiError>;

    /// `POST /ai/chat`; returns the assistant's text.
    async fn chat(&self, req: &ChatRequest) -> Result<String, ApiError>;
}

// Compile-time assertion: Backend must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Backend) {}
};
