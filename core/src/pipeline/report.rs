// docket/src/pipeline/report.rs
use crate::core::context::RunContext;
use crate::job::cache::RunIdentity;
use std::time::Duration;

/// Timing of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
  pub index: usize,
  pub name: String,
  pub kind: &'static str,
  pub elapsed: Duration,
}

/// Outcome of a run in which every stage completed.
#[derive(Debug, Clone)]
pub struct RunReport {
  pub identity: RunIdentity,
  pub stages: Vec<StageTiming>,
  /// The run context after the last stage, including exported values.
  pub attributes: RunContext,
}

impl RunReport {
  pub fn total_elapsed(&self) -> Duration {
    self.stages.iter().map(|s| s.elapsed).sum()
  }

  pub fn stage_names(&self) -> Vec<&str> {
    self.stages.iter().map(|s| s.name.as_str()).collect()
  }
}
