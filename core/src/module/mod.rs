// docket/src/module/mod.rs

//! Stage declarations: one tagged variant per stage kind, each carrying only
//! its own fields.

pub mod generic;
pub mod sax;
pub mod xslt;

pub use generic::GenericModuleConfig;
pub use sax::{SaxPipeConfig, XmlFilterConfig};
pub use xslt::{OutputMapper, SourceMode, XsltConfig};

use crate::error::DocketResult;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModuleConfig {
  Module(GenericModuleConfig),
  Transform(XsltConfig),
  FilterChain(SaxPipeConfig),
}

impl ModuleConfig {
  /// Human-readable stage name used in logs and errors.
  pub fn label(&self) -> String {
    match self {
      ModuleConfig::Module(m) => m.label(),
      ModuleConfig::Transform(x) => x.label(),
      ModuleConfig::FilterChain(s) => s.label(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ModuleConfig::Module(_) => "module",
      ModuleConfig::Transform(_) => "transform",
      ModuleConfig::FilterChain(_) => "filter-chain",
    }
  }

  /// Structural checks that must pass before any stage of the run executes.
  pub fn validate(&self, stage_index: usize) -> DocketResult<()> {
    match self {
      ModuleConfig::Module(m) => m.validate(stage_index),
      ModuleConfig::Transform(x) => x.validate(stage_index).map(|_| ()),
      ModuleConfig::FilterChain(s) => s.validate(stage_index),
    }
  }
}

impl From<GenericModuleConfig> for ModuleConfig {
  fn from(m: GenericModuleConfig) -> Self {
    ModuleConfig::Module(m)
  }
}

impl From<XsltConfig> for ModuleConfig {
  fn from(x: XsltConfig) -> Self {
    ModuleConfig::Transform(x)
  }
}

impl From<SaxPipeConfig> for ModuleConfig {
  fn from(s: SaxPipeConfig) -> Self {
    ModuleConfig::FilterChain(s)
  }
}
