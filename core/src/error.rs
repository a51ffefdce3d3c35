// docket/src/error.rs
use anyhow::Error as AnyhowError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocketError {
  #[error("Module must be specified")]
  NoModules,

  #[error("Temporary directory not set and property 'dita.temp.dir' is not defined")]
  MissingTempDir,

  #[error("Incomplete parameter in {owner}")]
  IncompleteParameter {
    owner: String,
    /// `None` for top-level pipeline params.
    stage_index: Option<usize>,
  },

  #[error("Configuration error for stage {stage_index} ('{stage}'): {message}")]
  Configuration {
    stage_index: usize,
    stage: String,
    message: String,
  },

  #[error("No {kind} implementation registered for '{id}'")]
  UnresolvedImplementation {
    kind: &'static str,
    id: String,
    stage_index: Option<usize>,
  },

  #[error("Failed to initialize job configuration in '{}'. Source: {source}", temp_dir.display())]
  JobInit {
    temp_dir: PathBuf,
    #[source]
    source: AnyhowError,
  },

  #[error("Failed to run pipeline: stage {stage_index} ('{stage}') failed: {source}")]
  StageFailed {
    stage_index: usize,
    stage: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Invalid pipeline declaration: {0}")]
  Declaration(String),

  #[error("Error in module implementation or external operation. Source: {source}")]
  ModuleError {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal docket error: {0}")]
  Internal(String),
}

impl DocketError {
  pub(crate) fn configuration(stage_index: usize, stage: impl Into<String>, message: impl Into<String>) -> Self {
    DocketError::Configuration {
      stage_index,
      stage: stage.into(),
      message: message.into(),
    }
  }

  /// Attributes a stage-less error to the stage at `index`.
  pub(crate) fn at_stage(self, index: usize) -> Self {
    match self {
      DocketError::IncompleteParameter { owner, stage_index: None } => DocketError::IncompleteParameter {
        owner,
        stage_index: Some(index),
      },
      DocketError::UnresolvedImplementation {
        kind,
        id,
        stage_index: None,
      } => DocketError::UnresolvedImplementation {
        kind,
        id,
        stage_index: Some(index),
      },
      other => other,
    }
  }

  /// Position of the stage this error is attributed to, if any.
  pub fn stage_index(&self) -> Option<usize> {
    match self {
      DocketError::Configuration { stage_index, .. } | DocketError::StageFailed { stage_index, .. } => {
        Some(*stage_index)
      }
      DocketError::IncompleteParameter { stage_index, .. }
      | DocketError::UnresolvedImplementation { stage_index, .. } => *stage_index,
      _ => None,
    }
  }

  /// True for errors detected before any stage ran.
  pub fn is_configuration(&self) -> bool {
    matches!(
      self,
      DocketError::NoModules
        | DocketError::MissingTempDir
        | DocketError::IncompleteParameter { .. }
        | DocketError::Configuration { .. }
        | DocketError::UnresolvedImplementation { .. }
        | DocketError::Declaration(_)
    )
  }
}

impl From<AnyhowError> for DocketError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a DocketError that travelled through anyhow instead of nesting it.
    match err.downcast::<DocketError>() {
      Ok(docket_err) => docket_err,
      Err(err) => DocketError::ModuleError { source: err },
    }
  }
}

pub type DocketResult<T, E = DocketError> = std::result::Result<T, E>;
