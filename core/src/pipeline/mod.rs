// booknest/core/src/pipeline/mod.rs

//! A small saga-style step runner.
//!
//! A [`Pipeline`] is an ordered list of named steps over a shared
//! [`ContextData`]. Each step has one or more `on` handlers and may register
//! compensation handlers. When a required step fails, the compensators of the
//! failing step and of every completed step run newest-first, then the
//! original error is returned. Compensators must only undo work the context
//! records as done.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Compensator, Handler, Pipeline};
pub use step::StepDef;

use thiserror::Error;

/// Misconfiguration of a pipeline, detected when it runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
