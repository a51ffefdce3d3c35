// docket/src/core/context.rs

//! The run-wide attribute bag threaded into every stage.

use serde::Serialize;
use std::collections::BTreeMap;

/// Attribute key for the free-text run message.
pub const ATTR_MESSAGE: &str = "message";
/// Attribute key for the input map reference.
pub const ATTR_INPUT_MAP: &str = "inputmap";
/// Attribute key for the absolute temp/work directory.
pub const ATTR_TEMP_DIR: &str = "tempDir";
/// Attribute key for the absolute base directory.
pub const ATTR_BASE_DIR: &str = "basedir";

/// String-keyed attribute bag.
///
/// The invoker seeds one instance per run and hands every stage its own clone,
/// so writes made by a stage stay local to it. Values a stage wants later stages
/// to see travel back through [`crate::StageOutput::exports`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunContext {
  attributes: BTreeMap<String, String>,
}

impl RunContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.attributes.get(key).map(String::as_str)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.attributes.contains_key(key)
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.attributes.insert(key.into(), value.into());
  }

  /// Sets `key` only when it has no value yet.
  pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl FnOnce() -> String) {
    self.attributes.entry(key.into()).or_insert_with(value);
  }

  pub fn remove(&mut self, key: &str) -> Option<String> {
    self.attributes.remove(key)
  }

  pub fn extend<I, K, V>(&mut self, entries: I)
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    for (k, v) in entries {
      self.set(k, v);
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.attributes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.attributes.is_empty()
  }

  /// Owned copy of all attributes.
  pub fn to_map(&self) -> BTreeMap<String, String> {
    self.attributes.clone()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RunContext {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut ctx = RunContext::new();
    ctx.extend(iter);
    ctx
  }
}
