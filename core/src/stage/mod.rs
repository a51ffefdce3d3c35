// docket/src/stage/mod.rs

//! Runtime side of a stage: the traits implementations plug in through, and
//! the two stage kinds the invoker builds directly.

pub mod logger;
pub mod xml_filter;
pub mod xslt;

pub use logger::StageLogger;
pub use xml_filter::{FilterPair, XmlFilterModule};
pub use xslt::{TransformSource, TransformTask, XsltModule};

use crate::core::context::RunContext;
use crate::job::handle::JobHandle;
use crate::job::info::FileInfo;
use crate::selection::filter::FileInfoPredicate;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Everything a stage is handed when it runs.
#[derive(Debug, Clone)]
pub struct StageInput {
  /// This stage's own copy of the run context.
  pub attributes: RunContext,
  pub job: JobHandle,
  pub logger: StageLogger,
}

/// What a stage hands back on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutput {
  /// Attributes merged into the run context for all later stages.
  pub exports: BTreeMap<String, String>,
}

impl StageOutput {
  pub fn export(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.exports.insert(key.into(), value.into());
    self
  }
}

/// A pipeline stage implementation resolved through the module factory.
#[async_trait]
pub trait PipelineModule: Send {
  /// Restricts the stage to manifest entries accepted by `filter`.
  /// Only called when the stage declares file-info filters.
  fn set_file_info_filter(&mut self, _filter: FileInfoPredicate) {}

  async fn execute(&mut self, input: StageInput) -> anyhow::Result<StageOutput>;
}

/// One filter of a filter chain.
///
/// Filters transform a whole document; each sees the output of the previous
/// filter that applied to the same file.
pub trait XmlFilter: Send {
  fn set_param(&mut self, name: &str, value: &str);

  /// Receives the chain stage's run context, chain-level params included,
  /// once before any file is filtered.
  fn set_attributes(&mut self, _attributes: &RunContext) {}

  fn filter(&mut self, file: &FileInfo, document: String) -> anyhow::Result<String>;
}

/// The style-sheet engine used by transform stages.
#[async_trait]
pub trait TransformEngine: Send + Sync {
  async fn transform(&self, task: &TransformTask) -> anyhow::Result<()>;
}
