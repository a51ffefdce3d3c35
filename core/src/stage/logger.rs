// docket/src/stage/logger.rs
use tracing::{event, Level};

/// Logging sink handed to each stage. Events carry the stage identity.
#[derive(Debug, Clone)]
pub struct StageLogger {
  stage_index: usize,
  stage: String,
}

impl StageLogger {
  pub fn new(stage_index: usize, stage: impl Into<String>) -> Self {
    Self {
      stage_index,
      stage: stage.into(),
    }
  }

  pub fn stage(&self) -> &str {
    &self.stage
  }

  pub fn stage_index(&self) -> usize {
    self.stage_index
  }

  pub fn debug(&self, message: &str) {
    event!(Level::DEBUG, stage_index = self.stage_index, stage = %self.stage, "{}", message);
  }

  pub fn info(&self, message: &str) {
    event!(Level::INFO, stage_index = self.stage_index, stage = %self.stage, "{}", message);
  }

  pub fn warn(&self, message: &str) {
    event!(Level::WARN, stage_index = self.stage_index, stage = %self.stage, "{}", message);
  }

  pub fn error(&self, message: &str) {
    event!(Level::ERROR, stage_index = self.stage_index, stage = %self.stage, "{}", message);
  }
}
