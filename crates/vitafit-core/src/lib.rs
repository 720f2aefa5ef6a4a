//! Client-side core of the guided fitness-planning workflow.
//!
//! Pure pieces (units, BMI, form record, validation) sit at the bottom; the
//! [`planner::Planner`] and [`chat::ChatController`] state machines sit on
//! top and talk to the backend only through [`api::Backend`].

pub mod api;
pub mod chat;
pub mod config;
pub mod form;
pub mod metrics;
pub mod planner;
pub mod session;
pub mod stage;
pub mod units;
pub mod validate;
