// booknest/core/src/pipeline/execution.rs

//! `Pipeline::run`, including compensation on failure.

use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::{PipelineControl, PipelineResult};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::PipelineError;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes every step in order against `ctx_data`.
  ///
  /// A required step that fails (or has no handler) triggers compensation of
  /// itself and all completed steps, newest first, before its error is
  /// returned. An optional step that fails is logged and skipped.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    if let Some(step_name) = self.unknown_steps.first() {
      event!(Level::ERROR, %step_name, "Handler registered for an undeclared step.");
      return Err(Err::from(PipelineError::StepNotFound {
        step_name: step_name.clone(),
      }));
    }

    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = info_span!(
        "pipeline_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
          self.compensate(&completed, &ctx_data).await;
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(parent: &step_span, Level::INFO, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) if step_def.optional => {
            event!(parent: &step_span, Level::WARN, error = %e, "Optional step failed, continuing.");
            break;
          }
          Err(e) => {
            event!(parent: &step_span, Level::ERROR, error = %e, "Step failed, compensating.");
            completed.push(step_name);
            self.compensate(&completed, &ctx_data).await;
            return Err(e);
          }
        }
      }

      completed.push(step_name);
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn compensate(&self, completed: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensators) = self.compensators.get(*step_name) else {
        continue;
      };
      for compensator in compensators {
        match compensator(ctx_data.clone()).await {
          Ok(()) => event!(Level::INFO, step_name, "Step compensated."),
          Err(e) => event!(Level::ERROR, step_name, error = %e, "Compensation failed."),
        }
      }
    }
  }
}
