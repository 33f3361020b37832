// booknest/core/tests/pipeline_tests.rs
mod common;
use booknest::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult};
use common::setup_tracing;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Default)]
struct Trace {
  events: Vec<String>,
  stop_at: Option<&'static str>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
enum TestError {
  #[error("pipeline: {0}")]
  Pipeline(PipelineError),
  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<PipelineError> for TestError {
  fn from(e: PipelineError) -> Self {
    TestError::Pipeline(e)
  }
}

type StepFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>>;
type UndoFuture = Pin<Box<dyn Future<Output = Result<(), TestError>> + Send>>;

fn record(step: &'static str) -> impl Fn(ContextData<Trace>) -> StepFuture + Send + Sync {
  move |ctx: ContextData<Trace>| -> StepFuture {
    Box::pin(async move {
      let stop = ctx.write_with(|t| {
        t.events.push(format!("run:{}", step));
        t.stop_at == Some(step)
      });
      Ok(if stop { PipelineControl::Stop } else { PipelineControl::Continue })
    })
  }
}

fn fail(step: &'static str) -> impl Fn(ContextData<Trace>) -> StepFuture + Send + Sync {
  move |ctx: ContextData<Trace>| -> StepFuture {
    Box::pin(async move {
      ctx.write().events.push(format!("fail:{}", step));
      Err(TestError::Handler(step.to_string()))
    })
  }
}

fn undo(step: &'static str) -> impl Fn(ContextData<Trace>) -> UndoFuture + Send + Sync {
  move |ctx: ContextData<Trace>| -> UndoFuture {
    Box::pin(async move {
      ctx.write().events.push(format!("undo:{}", step));
      Ok(())
    })
  }
}

fn events(ctx: &ContextData<Trace>) -> Vec<String> {
  ctx.read().events.clone()
}

#[tokio::test]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("b", false), ("c", false)]);
  p.on_step("c", record("c")).on_step("a", record("a")).on_step("b", record("b"));

  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(events(&ctx), vec!["run:a", "run:b", "run:c"]);
}

#[tokio::test]
async fn stop_skips_remaining_steps_without_compensation() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("b", false), ("c", false)]);
  p.on_step("a", record("a"))
    .compensate_step("a", undo("a"))
    .on_step("b", record("b"))
    .on_step("c", record("c"));

  let ctx = ContextData::new(Trace {
    stop_at: Some("b"),
    ..Default::default()
  });
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(events(&ctx), vec!["run:a", "run:b"]);
}

#[tokio::test]
async fn failure_compensates_failing_and_completed_steps_newest_first() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("b", false), ("c", false), ("d", false)]);
  p.on_step("a", record("a"))
    .compensate_step("a", undo("a"))
    .on_step("b", record("b"))
    .on_step("c", fail("c"))
    .compensate_step("c", undo("c"))
    .on_step("d", record("d"))
    .compensate_step("d", undo("d"));

  let ctx = ContextData::new(Trace::default());
  let err = p.run(ctx.clone()).await.unwrap_err();
  assert_eq!(err, TestError::Handler("c".to_string()));
  assert_eq!(events(&ctx), vec!["run:a", "run:b", "fail:c", "undo:c", "undo:a"]);
}

#[tokio::test]
async fn optional_step_failure_is_not_fatal() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("maybe", true), ("b", false)]);
  p.on_step("a", record("a"))
    .compensate_step("a", undo("a"))
    .on_step("maybe", fail("maybe"))
    .on_step("b", record("b"));

  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(events(&ctx), vec!["run:a", "fail:maybe", "run:b"]);
}

#[tokio::test]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("later", true)]);
  p.on_step("a", record("a"));

  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(events(&ctx), vec!["run:a"]);
}

#[tokio::test]
async fn missing_required_handler_compensates_and_errors() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false), ("missing", false)]);
  p.on_step("a", record("a")).compensate_step("a", undo("a"));

  let ctx = ContextData::new(Trace::default());
  let err = p.run(ctx.clone()).await.unwrap_err();
  assert_eq!(
    err,
    TestError::Pipeline(PipelineError::HandlerMissing {
      step_name: "missing".to_string()
    })
  );
  assert_eq!(events(&ctx), vec!["run:a", "undo:a"]);
}

#[tokio::test]
async fn handler_for_undeclared_step_fails_before_running() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new(&[("a", false)]);
  p.on_step("a", record("a")).on_step("typo", record("typo"));

  let ctx = ContextData::new(Trace::default());
  let err = p.run(ctx.clone()).await.unwrap_err();
  assert_eq!(
    err,
    TestError::Pipeline(PipelineError::StepNotFound {
      step_name: "typo".to_string()
    })
  );
  assert!(events(&ctx).is_empty());
}
