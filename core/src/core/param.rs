// docket/src/core/param.rs

//! Named parameters attached to the pipeline, its stages and filter entries.

use crate::core::properties::{Condition, Properties};
use crate::error::{DocketError, DocketResult};
use serde::Deserialize;
use std::path::Path;

/// A name/value pair, optionally gated by an `if`/`unless` condition.
///
/// Both fields are optional at declaration time so that an incomplete
/// declaration can be reported as a configuration error instead of failing
/// to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ParamDecl")]
pub struct Param {
  pub name: Option<String>,
  pub value: Option<String>,
  pub condition: Condition,
}

impl Param {
  /// A literal value.
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      value: Some(value.into()),
      condition: Condition::always(),
    }
  }

  /// A file path rendered as the value.
  pub fn location(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
    Self::new(name, path.as_ref().to_string_lossy().into_owned())
  }

  /// An expression string, passed through verbatim.
  pub fn expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
    Self::new(name, expression)
  }

  /// A parameter with only a name. Never valid; useful for testing validation.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      ..Default::default()
    }
  }

  pub fn when(mut self, property: impl Into<String>) -> Self {
    self.condition.if_property = Some(property.into());
    self
  }

  pub fn unless(mut self, property: impl Into<String>) -> Self {
    self.condition.unless_property = Some(property.into());
    self
  }

  pub fn is_valid(&self) -> bool {
    self.name.is_some() && self.value.is_some()
  }

  /// Name and value of a valid parameter whose condition holds.
  pub fn active_pair(&self, properties: &Properties) -> Option<(&str, &str)> {
    match (&self.name, &self.value) {
      (Some(name), Some(value)) if self.condition.is_active(properties) => Some((name, value)),
      _ => None,
    }
  }
}

/// Fails with `IncompleteParameter` if any parameter lacks a name or value.
pub fn validate_params(params: &[Param], owner: &str) -> DocketResult<()> {
  if params.iter().all(Param::is_valid) {
    Ok(())
  } else {
    Err(DocketError::IncompleteParameter {
      owner: owner.to_string(),
      stage_index: None,
    })
  }
}

/// Validates `params`, then hands every active pair to `sink` in declaration order.
pub fn apply_params(
  params: &[Param],
  properties: &Properties,
  owner: &str,
  mut sink: impl FnMut(&str, &str),
) -> DocketResult<()> {
  validate_params(params, owner)?;
  for (name, value) in params.iter().filter_map(|p| p.active_pair(properties)) {
    sink(name, value);
  }
  Ok(())
}

#[derive(Deserialize)]
struct ParamDecl {
  name: Option<String>,
  value: Option<String>,
  location: Option<String>,
  expression: Option<String>,
  #[serde(flatten)]
  condition: Condition,
}

impl From<ParamDecl> for Param {
  fn from(decl: ParamDecl) -> Self {
    Param {
      name: decl.name,
      value: decl.value.or(decl.location).or(decl.expression),
      condition: decl.condition,
    }
  }
}
