// docket/src/core/properties.rs

//! Host run properties and the `if`/`unless` gate evaluated against them.
//!
//! Only property *names* take part in gating; values are carried for lookups
//! such as the temp directory fallback.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The set of properties defined by the host for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.0.insert(name.into(), value.into());
    self
  }

  /// Builder form of [`Properties::define`].
  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.define(name, value);
    self
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Properties(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

/// Returns whether an element guarded by `if_property` / `unless_property` is active.
///
/// Active when `if_property` is absent or defined, and `unless_property` is
/// absent or undefined. Absent names never fail.
pub fn is_active(properties: &Properties, if_property: Option<&str>, unless_property: Option<&str>) -> bool {
  if_property.map_or(true, |name| properties.contains(name))
    && unless_property.map_or(true, |name| !properties.contains(name))
}

/// An `if`/`unless` pair attached to params, list files and filter entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Condition {
  #[serde(rename = "if", default)]
  pub if_property: Option<String>,
  #[serde(rename = "unless", default)]
  pub unless_property: Option<String>,
}

impl Condition {
  pub fn always() -> Self {
    Self::default()
  }

  pub fn is_active(&self, properties: &Properties) -> bool {
    is_active(properties, self.if_property.as_deref(), self.unless_property.as_deref())
  }
}
