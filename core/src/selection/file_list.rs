// docket/src/selection/file_list.rs

//! Include/exclude list files: one path per line.

use crate::core::properties::{Condition, Properties};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// Reference to a list file, optionally gated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncludesFile {
  #[serde(alias = "name")]
  pub file: PathBuf,
  #[serde(flatten)]
  pub condition: Condition,
}

impl IncludesFile {
  pub fn new(file: impl Into<PathBuf>) -> Self {
    Self {
      file: file.into(),
      condition: Condition::always(),
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
}

/// Union of the paths listed by every active source.
///
/// A source that cannot be opened or read is logged and contributes nothing.
pub fn read_list_files(sources: &[IncludesFile], properties: &Properties) -> BTreeSet<PathBuf> {
  let mut paths = BTreeSet::new();
  for source in sources {
    if !source.condition.is_active(properties) {
      event!(Level::TRACE, file = %source.file.display(), "List file gated out.");
      continue;
    }
    match read_list_file(&source.file) {
      Ok(listed) => paths.extend(listed),
      Err(e) => {
        event!(Level::WARN, file = %source.file.display(), error = %e, "Failed to read includes file.");
      }
    }
  }
  paths
}

/// Includes minus excludes.
pub fn resolve(includes: &[IncludesFile], excludes: &[IncludesFile], properties: &Properties) -> BTreeSet<PathBuf> {
  let mut included = read_list_files(includes, properties);
  for excluded in read_list_files(excludes, properties) {
    included.remove(&excluded);
  }
  included
}

fn read_list_file(path: &Path) -> io::Result<Vec<PathBuf>> {
  let reader = BufReader::new(File::open(path)?);
  let mut listed = Vec::new();
  for line in reader.lines() {
    let line = line?;
    let line = line.strip_suffix('\r').unwrap_or(&line);
    if !line.trim().is_empty() {
      listed.push(PathBuf::from(line));
    }
  }
  Ok(listed)
}
