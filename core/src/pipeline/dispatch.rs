// docket/src/pipeline/dispatch.rs

//! Turns one stage declaration into a runnable stage plus its own copy of the
//! run context. One strategy per stage kind.

use crate::core::context::RunContext;
use crate::core::param::apply_params;
use crate::core::properties::Properties;
use crate::error::{DocketError, DocketResult};
use crate::module::sax::SaxPipeConfig;
use crate::module::xslt::{SourceMode, XsltConfig};
use crate::module::{GenericModuleConfig, ModuleConfig};
use crate::registry::ModuleFactory;
use crate::selection::file_list::{resolve, IncludesFile};
use crate::selection::filter::{combine, FileInfoFilter};
use crate::stage::{FilterPair, PipelineModule, TransformSource, XmlFilterModule, XsltModule};
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// Run-level inputs every strategy reads.
pub(crate) struct DispatchContext<'a> {
  pub factory: &'a ModuleFactory,
  pub properties: &'a Properties,
  pub base_dir: &'a Path,
  pub temp_dir: &'a Path,
}

/// A constructed stage ready to execute.
pub(crate) struct PreparedStage {
  pub module: Box<dyn PipelineModule>,
  pub attributes: RunContext,
}

pub(crate) fn prepare(
  config: &ModuleConfig,
  stage_index: usize,
  attributes: RunContext,
  cx: &DispatchContext<'_>,
) -> DocketResult<PreparedStage> {
  match config {
    ModuleConfig::Transform(xslt) => prepare_transform(xslt, stage_index, attributes, cx),
    ModuleConfig::FilterChain(sax) => prepare_filter_chain(sax, stage_index, attributes, cx),
    ModuleConfig::Module(generic) => prepare_generic(generic, stage_index, attributes, cx),
  }
}

fn owner(stage_index: usize, label: &str) -> String {
  format!("stage {} ('{}')", stage_index, label)
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base.join(path)
  }
}

fn prepare_generic(
  config: &GenericModuleConfig,
  stage_index: usize,
  mut attributes: RunContext,
  cx: &DispatchContext<'_>,
) -> DocketResult<PreparedStage> {
  let label = config.label();
  apply_params(&config.params, cx.properties, &owner(stage_index, &label), |name, value| {
    attributes.set(name, value)
  })?;
  let id = config
    .id
    .as_deref()
    .ok_or_else(|| DocketError::configuration(stage_index, &label, "module implementation not defined"))?;
  let mut module = cx.factory.create_module(id)?;
  if !config.filters.is_empty() {
    module.set_file_info_filter(combine(&config.filters));
  }
  Ok(PreparedStage { module, attributes })
}

fn prepare_transform(
  config: &XsltConfig,
  stage_index: usize,
  mut attributes: RunContext,
  cx: &DispatchContext<'_>,
) -> DocketResult<PreparedStage> {
  let label = config.label();
  let mode = config.validate(stage_index)?;
  let style = config
    .style
    .as_deref()
    .map(|s| absolutize(cx.base_dir, s))
    .ok_or_else(|| DocketError::configuration(stage_index, &label, "style sheet not defined"))?;
  let missing = |what: &str| DocketError::configuration(stage_index, &label, format!("'{}' not set", what));

  let source = match mode {
    SourceMode::Single => TransformSource::Single {
      input: absolutize(cx.base_dir, config.in_file.as_deref().ok_or_else(|| missing("in"))?),
      output: absolutize(cx.base_dir, config.out_file.as_deref().ok_or_else(|| missing("out"))?),
    },
    SourceMode::Manifest => TransformSource::Manifest {
      filter: combine(&config.filters),
      dest_dir: config
        .dest_dir
        .as_deref()
        .map_or_else(|| cx.temp_dir.to_path_buf(), |d| absolutize(cx.base_dir, d)),
    },
    SourceMode::FileList => {
      let base_dir = absolutize(cx.base_dir, config.base_dir.as_deref().ok_or_else(|| missing("basedir"))?);
      let anchor = |files: &[IncludesFile]| -> Vec<IncludesFile> {
        files
          .iter()
          .map(|f| IncludesFile {
            file: absolutize(cx.base_dir, &f.file),
            condition: f.condition.clone(),
          })
          .collect()
      };
      let files = resolve(&anchor(&config.includes), &anchor(&config.excludes), cx.properties);
      event!(Level::DEBUG, stage_index, files = files.len(), "Resolved include/exclude lists.");
      TransformSource::FileList {
        files,
        dest_dir: config
          .dest_dir
          .as_deref()
          .map_or_else(|| base_dir.clone(), |d| absolutize(cx.base_dir, d)),
        base_dir,
      }
    }
  };

  let mut module = XsltModule::new(cx.factory.transform_engine()?, style, source);
  module.set_filename_param(config.filename_parameter.clone());
  module.set_filedir_param(config.filedir_parameter.clone());
  module.set_reload_stylesheet(config.reload_stylesheet);
  module.set_mapper(config.mapper.clone());
  module.set_extension(config.extension.clone());
  module.set_xml_catalog(config.xml_catalog.as_deref().map(|c| absolutize(cx.base_dir, c)));

  apply_params(&config.params, cx.properties, &owner(stage_index, &label), |name, value| {
    attributes.set(name, value)
  })?;
  Ok(PreparedStage {
    module: Box::new(module),
    attributes,
  })
}

fn prepare_filter_chain(
  config: &SaxPipeConfig,
  stage_index: usize,
  mut attributes: RunContext,
  cx: &DispatchContext<'_>,
) -> DocketResult<PreparedStage> {
  let label = config.label();
  let stage_owner = owner(stage_index, &label);
  apply_params(&config.params, cx.properties, &stage_owner, |name, value| {
    attributes.set(name, value)
  })?;

  let defaults = config.default_filters();
  let mut pipe = Vec::with_capacity(config.entries.len());
  for (entry_index, entry) in config.entries.iter().enumerate() {
    if !entry.condition.is_active(cx.properties) {
      event!(Level::DEBUG, stage_index, entry_index, "Filter gated out, skipping.");
      continue;
    }
    let id = entry.id.as_deref().ok_or_else(|| {
      DocketError::configuration(stage_index, &label, format!("filter {} has no implementation defined", entry_index))
    })?;
    let mut filter = cx.factory.create_filter(id)?;
    apply_params(
      &entry.params,
      cx.properties,
      &format!("{} filter {}", stage_owner, entry_index),
      |name, value| filter.set_param(name, value),
    )?;
    let predicates: Vec<&FileInfoFilter> = entry.filters.iter().chain(defaults.iter()).collect();
    debug_assert!(!predicates.is_empty(), "filter chain entry without selectors");
    pipe.push(FilterPair::new(filter, combine(predicates)));
  }

  let mut module = XmlFilterModule::new();
  module.set_file_info_filter(combine(defaults.iter().chain(config.file_filters.iter())));
  module.set_processing_pipe(pipe);
  Ok(PreparedStage {
    module: Box::new(module),
    attributes,
  })
}
