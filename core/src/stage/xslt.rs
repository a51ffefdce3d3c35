// docket/src/stage/xslt.rs

//! Transform stage: expands its source selection into per-file tasks and runs
//! them through the transform engine one at a time.

use crate::module::xslt::OutputMapper;
use crate::selection::filter::FileInfoPredicate;
use crate::stage::{PipelineModule, StageInput, StageOutput, TransformEngine};
use anyhow::Context as AnyhowContext;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Files a transform stage reads.
#[derive(Debug, Clone)]
pub enum TransformSource {
  Single {
    input: PathBuf,
    output: PathBuf,
  },
  /// Manifest entries, read from the job's temp dir.
  Manifest {
    filter: FileInfoPredicate,
    dest_dir: PathBuf,
  },
  /// Relative paths resolved against `base_dir`.
  FileList {
    files: BTreeSet<PathBuf>,
    base_dir: PathBuf,
    dest_dir: PathBuf,
  },
}

/// One style-sheet application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTask {
  pub style: PathBuf,
  pub input: PathBuf,
  pub output: PathBuf,
  pub parameters: BTreeMap<String, String>,
  pub reload_stylesheet: bool,
  pub xml_catalog: Option<PathBuf>,
}

pub struct XsltModule {
  engine: Arc<dyn TransformEngine>,
  style: PathBuf,
  source: TransformSource,
  filename_param: Option<String>,
  filedir_param: Option<String>,
  reload_stylesheet: bool,
  mapper: Option<OutputMapper>,
  extension: Option<String>,
  xml_catalog: Option<PathBuf>,
}

impl XsltModule {
  pub fn new(engine: Arc<dyn TransformEngine>, style: impl Into<PathBuf>, source: TransformSource) -> Self {
    Self {
      engine,
      style: style.into(),
      source,
      filename_param: None,
      filedir_param: None,
      reload_stylesheet: false,
      mapper: None,
      extension: None,
      xml_catalog: None,
    }
  }

  pub fn set_filename_param(&mut self, name: Option<String>) {
    self.filename_param = name;
  }

  pub fn set_filedir_param(&mut self, name: Option<String>) {
    self.filedir_param = name;
  }

  pub fn set_reload_stylesheet(&mut self, reload: bool) {
    self.reload_stylesheet = reload;
  }

  pub fn set_mapper(&mut self, mapper: Option<OutputMapper>) {
    self.mapper = mapper;
  }

  pub fn set_extension(&mut self, extension: Option<String>) {
    self.extension = extension;
  }

  pub fn set_xml_catalog(&mut self, catalog: Option<PathBuf>) {
    self.xml_catalog = catalog;
  }

  pub fn source(&self) -> &TransformSource {
    &self.source
  }

  fn map_output(&self, relative: &Path) -> Option<PathBuf> {
    match (&self.mapper, &self.extension) {
      (Some(mapper), _) => mapper.map(relative),
      (None, Some(ext)) => Some(relative.with_extension(ext.trim_start_matches('.'))),
      (None, None) => Some(relative.to_path_buf()),
    }
  }

  fn task(&self, relative: &Path, input: PathBuf, output: PathBuf, base: &BTreeMap<String, String>) -> TransformTask {
    let mut parameters = base.clone();
    if let Some(name) = &self.filename_param {
      let file_name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      parameters.insert(name.clone(), file_name);
    }
    if let Some(name) = &self.filedir_param {
      let dir = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_string(),
      };
      parameters.insert(name.clone(), dir);
    }
    TransformTask {
      style: self.style.clone(),
      input,
      output,
      parameters,
      reload_stylesheet: self.reload_stylesheet,
      xml_catalog: self.xml_catalog.clone(),
    }
  }

  /// Expands the source selection into tasks, in a stable order.
  pub fn plan(&self, input: &StageInput) -> Vec<TransformTask> {
    let base = input.attributes.to_map();
    match &self.source {
      TransformSource::Single { input: src, output } => {
        let relative = PathBuf::from(src.file_name().unwrap_or(src.as_os_str()));
        let mut task = self.task(&relative, src.clone(), output.clone(), &base);
        if let (Some(name), Some(parent)) = (&self.filedir_param, src.parent()) {
          if !parent.as_os_str().is_empty() {
            task.parameters.insert(name.clone(), parent.to_string_lossy().into_owned());
          }
        }
        vec![task]
      }
      TransformSource::Manifest { filter, dest_dir } => {
        let job = input.job.read();
        let temp_dir = job.temp_dir().to_path_buf();
        job
          .file_infos_matching(|f| filter.test(f))
          .filter_map(|f| {
            let relative = PathBuf::from(&f.uri);
            let Some(mapped) = self.map_output(&relative) else {
              event!(Level::DEBUG, uri = %f.uri, "No output mapping, skipping.");
              return None;
            };
            Some(self.task(&relative, temp_dir.join(&relative), dest_dir.join(mapped), &base))
          })
          .collect()
      }
      TransformSource::FileList {
        files,
        base_dir,
        dest_dir,
      } => files
        .iter()
        .filter_map(|relative| {
          let Some(mapped) = self.map_output(relative) else {
            event!(Level::DEBUG, file = %relative.display(), "No output mapping, skipping.");
            return None;
          };
          Some(self.task(relative, base_dir.join(relative), dest_dir.join(mapped), &base))
        })
        .collect(),
    }
  }
}

#[async_trait]
impl PipelineModule for XsltModule {
  #[instrument(name = "XsltModule::execute", skip_all, fields(style = %self.style.display()))]
  async fn execute(&mut self, input: StageInput) -> anyhow::Result<StageOutput> {
    let tasks = self.plan(&input);
    input
      .logger
      .info(&format!("Transforming {} file(s) with {}", tasks.len(), self.style.display()));
    for task in &tasks {
      if let Some(parent) = task.output.parent() {
        fs::create_dir_all(parent)
          .with_context(|| format!("Failed to create output directory '{}'", parent.display()))?;
      }
      event!(Level::TRACE, input = %task.input.display(), output = %task.output.display(), "Transforming.");
      self
        .engine
        .transform(task)
        .await
        .with_context(|| format!("Failed to transform '{}'", task.input.display()))?;
    }
    Ok(StageOutput::default())
  }
}
