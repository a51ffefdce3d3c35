// docket/src/job/info.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format tag of DITA topics.
pub const FORMAT_DITA: &str = "dita";
/// Format tag of DITA maps.
pub const FORMAT_DITAMAP: &str = "ditamap";

/// One source file known to the job.
///
/// `uri` is relative to the job's temp directory and is the manifest key.
/// The orchestrator only looks at `format`, `has_conref` and
/// `is_resource_only`; everything else belongs to the stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
  pub uri: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,
  #[serde(default)]
  pub has_conref: bool,
  #[serde(default)]
  pub is_resource_only: bool,
  #[serde(default)]
  pub is_input: bool,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub attributes: BTreeMap<String, String>,
}

impl FileInfo {
  pub fn new(uri: impl Into<String>) -> Self {
    Self {
      uri: uri.into(),
      ..Default::default()
    }
  }

  pub fn with_format(mut self, format: impl Into<String>) -> Self {
    self.format = Some(format.into());
    self
  }

  pub fn with_conref(mut self, has_conref: bool) -> Self {
    self.has_conref = has_conref;
    self
  }

  pub fn resource_only(mut self, is_resource_only: bool) -> Self {
    self.is_resource_only = is_resource_only;
    self
  }

  pub fn input(mut self, is_input: bool) -> Self {
    self.is_input = is_input;
    self
  }
}
