// booknest/core/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and handler registration.

use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use crate::pipeline::step::StepDef;
use crate::pipeline::PipelineError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A step handler. It receives a clone of the run's context and resolves to a
/// [`PipelineControl`] or the pipeline's error type.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// Undo logic for a step. Failures are logged by the runner, never returned.
pub type Compensator<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>;

pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) compensators: HashMap<String, Vec<Compensator<TData, Err>>>,
  // Handlers registered against names that are not steps. Reported by `run`.
  pub(crate) unknown_steps: Vec<String>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional)` pairs, in execution order.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      compensators: HashMap::new(),
      unknown_steps: Vec::new(),
    }
  }

  pub fn steps(&self) -> &[StepDef] {
    &self.steps
  }

  fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  fn track_step(&mut self, step_name: &str) -> bool {
    if self.has_step(step_name) {
      return true;
    }
    if !self.unknown_steps.iter().any(|s| s == step_name) {
      self.unknown_steps.push(step_name.to_string());
    }
    false
  }

  /// Registers a handler for `step_name`. Handlers of one step run in
  /// registration order.
  pub fn on_step<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> &mut Self
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    if self.track_step(step_name) {
      let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
        let user_fut = handler_fn(ctx_data);
        Box::pin(async move { user_fut.await.map_err(Into::into) })
      });
      self.on.entry(step_name.to_string()).or_default().push(handler);
    }
    self
  }

  /// Registers undo logic for `step_name`.
  pub fn compensate_step<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    compensator_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> &mut Self
  where
    F: Future<Output = Result<(), UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    if self.track_step(step_name) {
      let compensator: Compensator<TData, Err> = Box::new(move |ctx_data| {
        let user_fut = compensator_fn(ctx_data);
        Box::pin(async move { user_fut.await.map_err(Into::into) })
      });
      self
        .compensators
        .entry(step_name.to_string())
        .or_default()
        .push(compensator);
    }
    self
  }
}
