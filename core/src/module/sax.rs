// docket/src/module/sax.rs

//! Declaration of a streaming filter-chain stage.

use crate::core::param::{validate_params, Param};
use crate::core::properties::Condition;
use crate::error::DocketResult;
use crate::selection::filter::{default_format_filters, FileInfoFilter};
use serde::Deserialize;

/// One entry of a filter chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct XmlFilterConfig {
  /// Factory identifier of the filter implementation.
  pub id: Option<String>,
  pub params: Vec<Param>,
  pub filters: Vec<FileInfoFilter>,
  #[serde(flatten)]
  pub condition: Condition,
}

impl XmlFilterConfig {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: Some(id.into()),
      ..Default::default()
    }
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn filter(mut self, filter: FileInfoFilter) -> Self {
    self.filters.push(filter);
    self
  }

  pub fn when(mut self, property: impl Into<String>) -> Self {
    self.condition.if_property = Some(property.into());
    self
  }

  pub fn unless(mut self, property: impl Into<String>) -> Self {
    self.condition.unless_property = Some(property.into());
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaxPipeConfig {
  pub name: Option<String>,
  /// Formats the chain applies to. Defaults to DITA topics and maps.
  #[serde(deserialize_with = "one_or_many")]
  pub format: Option<Vec<String>>,
  #[serde(rename = "filters")]
  pub entries: Vec<XmlFilterConfig>,
  #[serde(rename = "file-filters", alias = "file_filters")]
  pub file_filters: Vec<FileInfoFilter>,
  pub params: Vec<Param>,
}

impl SaxPipeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn format(mut self, format: impl Into<String>) -> Self {
    self.format.get_or_insert_with(Vec::new).push(format.into());
    self
  }

  pub fn entry(mut self, entry: XmlFilterConfig) -> Self {
    self.entries.push(entry);
    self
  }

  pub fn file_filter(mut self, filter: FileInfoFilter) -> Self {
    self.file_filters.push(filter);
    self
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  /// Format filters every entry, and the chain as a whole, is OR-ed with.
  pub fn default_filters(&self) -> Vec<FileInfoFilter> {
    default_format_filters(self.format.as_deref())
  }

  pub(crate) fn label(&self) -> String {
    if let Some(name) = &self.name {
      return name.clone();
    }
    let ids: Vec<&str> = self.entries.iter().filter_map(|e| e.id.as_deref()).collect();
    format!("filter-chain[{}]", ids.join(","))
  }

  pub(crate) fn validate(&self, stage_index: usize) -> DocketResult<()> {
    let owner = format!("stage {} ('{}')", stage_index, self.label());
    validate_params(&self.params, &owner)?;
    // Only active entries need an id; checked in `Invoker::initialize`.
    for (entry_index, entry) in self.entries.iter().enumerate() {
      validate_params(&entry.params, &format!("{} filter {}", owner, entry_index))?;
    }
    Ok(())
  }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum OneOrMany {
    One(String),
    Many(Vec<String>),
  }
  Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
    None => None,
    Some(OneOrMany::One(format)) => Some(vec![format]),
    Some(OneOrMany::Many(formats)) => Some(formats),
  })
}
