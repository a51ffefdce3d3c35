// docket/src/selection/filter.rs

//! Manifest-entry selectors and their OR combination.

use crate::job::info::{FileInfo, FORMAT_DITA, FORMAT_DITAMAP};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// `processing-role` value that marks an entry as resource-only.
pub const PROCESSING_ROLE_RESOURCE_ONLY: &str = "resource-only";

/// Conjunction of optional field tests. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "FileInfoFilterDecl")]
pub struct FileInfoFilter {
  pub format: Option<String>,
  pub conref: Option<bool>,
  pub resource_only: Option<bool>,
}

impl FileInfoFilter {
  pub fn any() -> Self {
    Self::default()
  }

  pub fn format(format: impl Into<String>) -> Self {
    Self {
      format: Some(format.into()),
      ..Default::default()
    }
  }

  pub fn with_conref(mut self, conref: bool) -> Self {
    self.conref = Some(conref);
    self
  }

  pub fn with_resource_only(mut self, resource_only: bool) -> Self {
    self.resource_only = Some(resource_only);
    self
  }

  /// Sets the resource-only test from a `processing-role` attribute value.
  pub fn with_processing_role(self, role: &str) -> Self {
    self.with_resource_only(role == PROCESSING_ROLE_RESOURCE_ONLY)
  }

  pub fn matches(&self, info: &FileInfo) -> bool {
    self.format.as_deref().map_or(true, |f| info.format.as_deref() == Some(f))
      && self.conref.map_or(true, |c| info.has_conref == c)
      && self.resource_only.map_or(true, |r| info.is_resource_only == r)
  }
}

/// Shareable predicate over manifest entries.
#[derive(Clone)]
pub struct FileInfoPredicate(Arc<dyn Fn(&FileInfo) -> bool + Send + Sync + 'static>);

impl FileInfoPredicate {
  pub fn new(f: impl Fn(&FileInfo) -> bool + Send + Sync + 'static) -> Self {
    FileInfoPredicate(Arc::new(f))
  }

  pub fn test(&self, info: &FileInfo) -> bool {
    (self.0)(info)
  }
}

impl fmt::Debug for FileInfoPredicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("FileInfoPredicate(..)")
  }
}

/// OR-combines `filters`, evaluated in order with short-circuit.
///
/// An empty list yields a predicate that matches nothing.
pub fn combine<'a>(filters: impl IntoIterator<Item = &'a FileInfoFilter>) -> FileInfoPredicate {
  let filters: Vec<FileInfoFilter> = filters.into_iter().cloned().collect();
  FileInfoPredicate::new(move |info| filters.iter().any(|f| f.matches(info)))
}

/// One format filter per entry of `formats`, or the DITA topic and map formats
/// when no explicit list is given.
pub fn default_format_filters(formats: Option<&[String]>) -> Vec<FileInfoFilter> {
  match formats {
    Some(formats) => formats.iter().map(FileInfoFilter::format).collect(),
    None => vec![FileInfoFilter::format(FORMAT_DITA), FileInfoFilter::format(FORMAT_DITAMAP)],
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FileInfoFilterDecl {
  format: Option<String>,
  conref: Option<bool>,
  processing_role: Option<String>,
}

impl From<FileInfoFilterDecl> for FileInfoFilter {
  fn from(decl: FileInfoFilterDecl) -> Self {
    FileInfoFilter {
      format: decl.format,
      conref: decl.conref,
      resource_only: decl.processing_role.map(|r| r == PROCESSING_ROLE_RESOURCE_ONLY),
    }
  }
}
