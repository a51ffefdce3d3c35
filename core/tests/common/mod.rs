// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use docket::{
  FileInfo, FileInfoPredicate, ModuleFactory, PipelineModule, RunContext, StageInput, StageOutput, TransformEngine,
  TransformTask, XmlFilter,
};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

// --- What a recording stage saw when it ran ---
#[derive(Clone, Debug)]
pub struct Visit {
  pub module: String,
  pub stage: String,
  pub attributes: RunContext,
  /// Manifest uris accepted by the stage's file-info filter, if one was set.
  pub matched: Option<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct Recorder {
  visits: Arc<Mutex<Vec<Visit>>>,
}

impl Recorder {
  pub fn visits(&self) -> Vec<Visit> {
    self.visits.lock().clone()
  }

  pub fn modules_run(&self) -> Vec<String> {
    self.visits.lock().iter().map(|v| v.module.clone()).collect()
  }

  fn push(&self, visit: Visit) {
    self.visits.lock().push(visit);
  }
}

// --- Generic stage that records its input ---
pub struct RecordingModule {
  id: String,
  recorder: Recorder,
  exports: Vec<(String, String)>,
  fail_with: Option<String>,
  filter: Option<FileInfoPredicate>,
  add_file: Option<FileInfo>,
}

impl RecordingModule {
  pub fn new(id: &str, recorder: &Recorder) -> Self {
    Self {
      id: id.to_string(),
      recorder: recorder.clone(),
      exports: Vec::new(),
      fail_with: None,
      filter: None,
      add_file: None,
    }
  }

  pub fn exporting(mut self, key: &str, value: &str) -> Self {
    self.exports.push((key.to_string(), value.to_string()));
    self
  }

  pub fn failing(mut self, message: &str) -> Self {
    self.fail_with = Some(message.to_string());
    self
  }

  pub fn adding(mut self, info: FileInfo) -> Self {
    self.add_file = Some(info);
    self
  }
}

#[async_trait]
impl PipelineModule for RecordingModule {
  fn set_file_info_filter(&mut self, filter: FileInfoPredicate) {
    self.filter = Some(filter);
  }

  async fn execute(&mut self, input: StageInput) -> anyhow::Result<StageOutput> {
    let matched = self.filter.as_ref().map(|filter| {
      let job = input.job.read();
      job.file_infos_matching(|f| filter.test(f)).map(|f| f.uri.clone()).collect()
    });
    self.recorder.push(Visit {
      module: self.id.clone(),
      stage: input.logger.stage().to_string(),
      attributes: input.attributes.clone(),
      matched,
    });
    if let Some(info) = &self.add_file {
      input.job.write().add(info.clone());
    }
    if let Some(message) = &self.fail_with {
      input.logger.error(message);
      anyhow::bail!("{}", message);
    }
    let mut output = StageOutput::default();
    for (k, v) in &self.exports {
      output = output.export(k.as_str(), v.as_str());
    }
    Ok(output)
  }
}

// --- Chain filter appending a marker to the document ---
pub struct AppendFilter {
  marker: String,
}

impl AppendFilter {
  pub fn new(marker: &str) -> Self {
    Self {
      marker: marker.to_string(),
    }
  }
}

impl XmlFilter for AppendFilter {
  fn set_param(&mut self, name: &str, value: &str) {
    if name == "marker" {
      self.marker = value.to_string();
    }
  }

  fn filter(&mut self, _file: &FileInfo, mut document: String) -> anyhow::Result<String> {
    document.push_str(&self.marker);
    Ok(document)
  }
}

// --- Chain filter recording the run context it was handed ---
pub struct AttributesFilter {
  recorder: Recorder,
}

impl AttributesFilter {
  pub fn new(recorder: &Recorder) -> Self {
    Self {
      recorder: recorder.clone(),
    }
  }
}

impl XmlFilter for AttributesFilter {
  fn set_param(&mut self, _name: &str, _value: &str) {}

  fn set_attributes(&mut self, attributes: &RunContext) {
    self.recorder.push(Visit {
      module: "record-attrs".to_string(),
      stage: String::new(),
      attributes: attributes.clone(),
      matched: None,
    });
  }

  fn filter(&mut self, _file: &FileInfo, document: String) -> anyhow::Result<String> {
    Ok(document)
  }
}

// --- Transform engine that records tasks and writes a stub output ---
#[derive(Clone, Default)]
pub struct RecordingEngine {
  tasks: Arc<Mutex<Vec<TransformTask>>>,
}

impl RecordingEngine {
  pub fn tasks(&self) -> Vec<TransformTask> {
    self.tasks.lock().clone()
  }
}

#[async_trait]
impl TransformEngine for RecordingEngine {
  async fn transform(&self, task: &TransformTask) -> anyhow::Result<()> {
    fs::write(&task.output, format!("transformed {}", task.input.display()))?;
    self.tasks.lock().push(task.clone());
    Ok(())
  }
}

/// Factory with `record-a`, `record-b`, `export`, `fail`, the `append` and
/// `record-attrs` filters and a recording transform engine.
pub fn test_factory(recorder: &Recorder, engine: &RecordingEngine) -> Arc<ModuleFactory> {
  let factory = ModuleFactory::new();
  let r = recorder.clone();
  factory.register_module("record-a", move || RecordingModule::new("record-a", &r));
  let r = recorder.clone();
  factory.register_module("record-b", move || RecordingModule::new("record-b", &r));
  let r = recorder.clone();
  factory.register_module("export", move || RecordingModule::new("export", &r).exporting("exported", "yes"));
  let r = recorder.clone();
  factory.register_module("fail", move || RecordingModule::new("fail", &r).failing("boom"));
  factory.register_filter("append", || AppendFilter::new("+"));
  let r = recorder.clone();
  factory.register_filter("record-attrs", move || AttributesFilter::new(&r));
  factory.set_transform_engine(Arc::new(engine.clone()));
  Arc::new(factory)
}

pub fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
  let path = dir.join(name);
  let mut text = lines.join("\n");
  text.push('\n');
  fs::write(&path, text).unwrap();
  path
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
