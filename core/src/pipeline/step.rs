// booknest/core/src/pipeline/step.rs

/// A named stage of a pipeline.
///
/// An `optional` step is best-effort: a missing handler is skipped and a
/// failing handler is logged without failing the run or triggering compensation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}
