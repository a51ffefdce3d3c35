// docket/src/module/generic.rs
use crate::core::param::{validate_params, Param};
use crate::error::{DocketError, DocketResult};
use crate::selection::filter::FileInfoFilter;
use serde::Deserialize;

/// A stage whose implementation is resolved through the module factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenericModuleConfig {
  pub name: Option<String>,
  /// Factory identifier of the implementation.
  pub id: Option<String>,
  pub params: Vec<Param>,
  pub filters: Vec<FileInfoFilter>,
}

impl GenericModuleConfig {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: Some(id.into()),
      ..Default::default()
    }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn filter(mut self, filter: FileInfoFilter) -> Self {
    self.filters.push(filter);
    self
  }

  pub(crate) fn label(&self) -> String {
    self
      .name
      .clone()
      .or_else(|| self.id.clone())
      .unwrap_or_else(|| "module".to_string())
  }

  pub(crate) fn validate(&self, stage_index: usize) -> DocketResult<()> {
    let label = self.label();
    validate_params(&self.params, &format!("stage {} ('{}')", stage_index, label))?;
    if self.id.is_none() {
      return Err(DocketError::configuration(stage_index, label, "module implementation not defined"));
    }
    Ok(())
  }
}
