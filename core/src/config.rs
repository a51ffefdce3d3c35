// docket/src/config.rs

//! Pipeline declarations and the run-scoped settings an invocation consumes.

use crate::core::param::Param;
use crate::core::properties::Properties;
use crate::error::{DocketError, DocketResult};
use crate::module::ModuleConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// Host property naming the temp directory when none is set explicitly.
pub const PROPERTY_TEMP_DIR: &str = "dita.temp.dir";

/// Top-level parameters and the ordered stage list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineDeclaration {
  pub params: Vec<Param>,
  pub modules: Vec<ModuleConfig>,
}

impl PipelineDeclaration {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn module(mut self, module: impl Into<ModuleConfig>) -> Self {
    self.modules.push(module.into());
    self
  }

  pub fn from_json_str(text: &str) -> DocketResult<Self> {
    serde_json::from_str(text).map_err(|e| DocketError::Declaration(e.to_string()))
  }

  pub fn from_path(path: impl AsRef<Path>) -> DocketResult<Self> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
      .map_err(|e| DocketError::Declaration(format!("cannot read '{}': {}", path.display(), e)))?;
    let declaration = Self::from_json_str(&text)?;
    event!(Level::INFO, path = %path.display(), modules = declaration.modules.len(), "Pipeline declaration loaded.");
    Ok(declaration)
  }
}

/// Inputs supplied by the host for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
  pub temp_dir: Option<PathBuf>,
  pub base_dir: PathBuf,
  pub message: Option<String>,
  pub input_map: Option<String>,
  pub properties: Properties,
}

impl RunSettings {
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
      ..Default::default()
    }
  }

  pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.temp_dir = Some(dir.into());
    self
  }

  pub fn message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn input_map(mut self, input_map: impl Into<String>) -> Self {
    self.input_map = Some(input_map.into());
    self
  }

  pub fn properties(mut self, properties: Properties) -> Self {
    self.properties = properties;
    self
  }

  pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.properties.define(name, value);
    self
  }

  /// Absolute base directory. An empty base dir means the current directory.
  pub fn resolved_base_dir(&self) -> DocketResult<PathBuf> {
    let base_dir = if self.base_dir.as_os_str().is_empty() {
      Path::new(".")
    } else {
      self.base_dir.as_path()
    };
    std::path::absolute(base_dir)
      .map_err(|e| DocketError::Internal(format!("cannot resolve base dir '{}': {}", base_dir.display(), e)))
  }

  /// Absolute temp directory: the explicit one, else the `dita.temp.dir`
  /// property, relative paths taken against the base directory.
  pub fn resolved_temp_dir(&self) -> DocketResult<PathBuf> {
    let temp_dir = match (&self.temp_dir, self.properties.get(PROPERTY_TEMP_DIR)) {
      (Some(dir), _) => dir.clone(),
      (None, Some(dir)) => PathBuf::from(dir),
      (None, None) => return Err(DocketError::MissingTempDir),
    };
    if temp_dir.is_absolute() {
      Ok(temp_dir)
    } else {
      Ok(self.resolved_base_dir()?.join(temp_dir))
    }
  }
}
