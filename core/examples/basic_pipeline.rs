// docket/examples/basic_pipeline.rs

use async_trait::async_trait;
use docket::{
  DocketError, FileInfo, FileInfoFilter, GenericModuleConfig, Invoker, ModuleFactory, Param, PipelineDeclaration,
  PipelineModule, RunIdentity, RunSettings, SaxPipeConfig, StageInput, StageOutput, TransformEngine, TransformTask,
  XmlFilter, XmlFilterConfig, XsltConfig,
};
use std::fs;
use std::sync::Arc;
use tracing::info;

// 1. A generic stage that discovers the sources and records them in the job.
struct GenList;

#[async_trait]
impl PipelineModule for GenList {
  async fn execute(&mut self, input: StageInput) -> anyhow::Result<StageOutput> {
    let temp_dir = input.job.read().temp_dir().to_path_buf();
    fs::create_dir_all(&temp_dir)?;
    for (uri, format) in [("intro.dita", "dita"), ("guide.ditamap", "ditamap"), ("logo.png", "image")] {
      fs::write(temp_dir.join(uri), format!("<{}/>", format))?;
      input.job.write().add(FileInfo::new(uri).with_format(format).input(true));
    }
    input.job.write().write()?;
    input.logger.info("Source list generated.");
    Ok(StageOutput::default().export("sources", "3"))
  }
}

// 2. A chain filter.
struct Upper;

impl XmlFilter for Upper {
  fn set_param(&mut self, _name: &str, _value: &str) {}

  fn filter(&mut self, _file: &FileInfo, document: String) -> anyhow::Result<String> {
    Ok(document.to_uppercase())
  }
}

// 3. A transform engine. A real host would run an XSLT processor here.
struct CopyEngine;

#[async_trait]
impl TransformEngine for CopyEngine {
  async fn transform(&self, task: &TransformTask) -> anyhow::Result<()> {
    fs::copy(&task.input, &task.output)?;
    info!(input = %task.input.display(), output = %task.output.display(), "Copied.");
    Ok(())
  }
}

#[tokio::main]
async fn main() -> Result<(), DocketError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  let factory = Arc::new(ModuleFactory::new());
  factory.register_module("gen-list", || GenList);
  factory.register_filter("upper", || Upper);
  factory.set_transform_engine(Arc::new(CopyEngine));

  let declaration = PipelineDeclaration::new()
    .param(Param::new("transtype", "html5"))
    .module(GenericModuleConfig::new("gen-list").named("Generate list"))
    .module(SaxPipeConfig::new().named("Normalize").entry(XmlFilterConfig::new("upper")))
    .module(
      XsltConfig::new("xsl/topic.xsl")
        .filter(FileInfoFilter::format("dita"))
        .dest_dir("out")
        .extension("html"),
    );

  let work = std::env::temp_dir().join("docket-basic-pipeline");
  let settings = RunSettings::new(&work).temp_dir("temp").message("Building guide");

  let invoker = Invoker::new(declaration, factory);
  let report = invoker.execute(&settings, &RunIdentity::new("example")).await?;

  for stage in &report.stages {
    info!("Stage {} '{}' ({}) took {:?}", stage.index, stage.name, stage.kind, stage.elapsed);
  }
  info!("Exported sources = {:?}", report.attributes.get("sources"));
  info!("--- Example Finished ---");
  Ok(())
}
