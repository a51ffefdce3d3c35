// docket/src/module/xslt.rs

//! Declaration of a style-sheet transform stage.

use crate::core::param::{validate_params, Param};
use crate::error::{DocketError, DocketResult};
use crate::selection::file_list::IncludesFile;
use crate::selection::filter::FileInfoFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Rule mapping a source path (relative) to its output path (relative).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputMapper {
  Identity,
  /// Drops all directories, keeping only the file name.
  Flatten,
  /// Single-`*` glob, e.g. `*.xml` to `*.html`. Non-matching sources are skipped.
  Glob { from: String, to: String },
}

impl OutputMapper {
  pub fn glob(from: impl Into<String>, to: impl Into<String>) -> Self {
    OutputMapper::Glob {
      from: from.into(),
      to: to.into(),
    }
  }

  /// Maps `source`, or `None` when the rule does not apply to it.
  pub fn map(&self, source: &Path) -> Option<PathBuf> {
    match self {
      OutputMapper::Identity => Some(source.to_path_buf()),
      OutputMapper::Flatten => source.file_name().map(PathBuf::from),
      OutputMapper::Glob { from, to } => {
        let source = source.to_string_lossy().replace('\\', "/");
        let Some((prefix, suffix)) = from.split_once('*') else {
          return (source == *from).then(|| PathBuf::from(to));
        };
        if source.len() < prefix.len() + suffix.len() || !source.starts_with(prefix) || !source.ends_with(suffix) {
          return None;
        }
        let matched = &source[prefix.len()..source.len() - suffix.len()];
        Some(PathBuf::from(to.replacen('*', matched, 1)))
      }
    }
  }
}

/// Which of the three source-selection modes a transform declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
  /// Explicit input/output file pair.
  Single,
  /// Manifest entries selected by file-info filters.
  Manifest,
  /// Files listed by include/exclude list files under a base directory.
  FileList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct XsltConfig {
  pub name: Option<String>,
  pub style: Option<PathBuf>,
  #[serde(alias = "basedir")]
  pub base_dir: Option<PathBuf>,
  #[serde(alias = "destdir")]
  pub dest_dir: Option<PathBuf>,
  #[serde(rename = "in")]
  pub in_file: Option<PathBuf>,
  #[serde(rename = "out")]
  pub out_file: Option<PathBuf>,
  pub includes: Vec<IncludesFile>,
  pub excludes: Vec<IncludesFile>,
  pub mapper: Option<OutputMapper>,
  pub extension: Option<String>,
  #[serde(alias = "filenameparameter")]
  pub filename_parameter: Option<String>,
  #[serde(alias = "filedirparameter")]
  pub filedir_parameter: Option<String>,
  #[serde(alias = "reloadstylesheet")]
  pub reload_stylesheet: bool,
  #[serde(alias = "xmlcatalog")]
  pub xml_catalog: Option<PathBuf>,
  pub params: Vec<Param>,
  pub filters: Vec<FileInfoFilter>,
}

impl XsltConfig {
  pub fn new(style: impl Into<PathBuf>) -> Self {
    Self {
      style: Some(style.into()),
      ..Default::default()
    }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn single(mut self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
    self.in_file = Some(input.into());
    self.out_file = Some(output.into());
    self
  }

  pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.base_dir = Some(dir.into());
    self
  }

  pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.dest_dir = Some(dir.into());
    self
  }

  pub fn include(mut self, file: IncludesFile) -> Self {
    self.includes.push(file);
    self
  }

  pub fn exclude(mut self, file: IncludesFile) -> Self {
    self.excludes.push(file);
    self
  }

  pub fn filter(mut self, filter: FileInfoFilter) -> Self {
    self.filters.push(filter);
    self
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn extension(mut self, extension: impl Into<String>) -> Self {
    self.extension = Some(extension.into());
    self
  }

  pub fn filename_parameter(mut self, name: impl Into<String>) -> Self {
    self.filename_parameter = Some(name.into());
    self
  }

  pub fn filedir_parameter(mut self, name: impl Into<String>) -> Self {
    self.filedir_parameter = Some(name.into());
    self
  }

  pub fn reload_stylesheet(mut self, reload: bool) -> Self {
    self.reload_stylesheet = reload;
    self
  }

  /// Sets the output mapper. Only one mapper may be defined.
  pub fn add_mapper(&mut self, mapper: OutputMapper) -> DocketResult<()> {
    if self.mapper.is_some() {
      return Err(DocketError::Declaration("Cannot define more than one mapper".to_string()));
    }
    self.mapper = Some(mapper);
    Ok(())
  }

  pub(crate) fn label(&self) -> String {
    self
      .name
      .clone()
      .or_else(|| {
        self
          .style
          .as_deref()
          .and_then(Path::file_name)
          .map(|n| n.to_string_lossy().into_owned())
      })
      .unwrap_or_else(|| "transform".to_string())
  }

  /// The declared source mode. Fails unless exactly one mode is configured.
  pub fn source_mode(&self, stage_index: usize) -> DocketResult<SourceMode> {
    let mut declared = Vec::new();
    if self.in_file.is_some() || self.out_file.is_some() {
      declared.push(SourceMode::Single);
    }
    if !self.filters.is_empty() {
      declared.push(SourceMode::Manifest);
    }
    if !self.includes.is_empty() {
      declared.push(SourceMode::FileList);
    }
    match declared.as_slice() {
      [mode] => Ok(*mode),
      [] => Err(DocketError::configuration(
        stage_index,
        self.label(),
        "cannot determine source: no in/out pair, file-info filters or includes file",
      )),
      modes => Err(DocketError::configuration(
        stage_index,
        self.label(),
        format!("conflicting source modes {:?}, exactly one is allowed", modes),
      )),
    }
  }

  pub(crate) fn validate(&self, stage_index: usize) -> DocketResult<SourceMode> {
    let label = self.label();
    validate_params(&self.params, &format!("stage {} ('{}')", stage_index, label))?;
    if self.style.is_none() {
      return Err(DocketError::configuration(stage_index, label, "style sheet not defined"));
    }
    let mode = self.source_mode(stage_index)?;
    match mode {
      SourceMode::Single if self.in_file.is_none() || self.out_file.is_none() => Err(DocketError::configuration(
        stage_index,
        label,
        "both 'in' and 'out' must be set",
      )),
      SourceMode::FileList if self.base_dir.is_none() => Err(DocketError::configuration(
        stage_index,
        label,
        "includes files require a base directory",
      )),
      _ => Ok(mode),
    }
  }
}
