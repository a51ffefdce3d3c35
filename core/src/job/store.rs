// docket/src/job/store.rs

//! The persisted job manifest.

use crate::job::info::FileInfo;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// File name of the persisted manifest inside the temp directory.
pub const JOB_FILE: &str = ".job.json";
/// File name of the generation marker inside the temp directory.
pub const GENERATION_FILE: &str = ".job.generation";

#[derive(Debug, Default, Serialize, Deserialize)]
struct JobState {
  #[serde(default)]
  properties: BTreeMap<String, String>,
  #[serde(default)]
  files: Vec<FileInfo>,
}

/// Description of every file in the current job, rooted at a temp directory.
///
/// Every successful [`Job::write`] bumps an on-disk generation counter. An
/// instance whose loaded generation no longer matches the marker on disk is
/// stale and must not be reused.
#[derive(Debug)]
pub struct Job {
  temp_dir: PathBuf,
  files: BTreeMap<String, FileInfo>,
  properties: BTreeMap<String, String>,
  generation: u64,
  stale: bool,
}

impl Job {
  /// Opens the job rooted at `temp_dir`.
  ///
  /// A missing state file yields an empty job. An unreadable or malformed one
  /// is an error.
  pub fn open(temp_dir: impl Into<PathBuf>) -> Result<Self> {
    let temp_dir = temp_dir.into();
    let job_file = temp_dir.join(JOB_FILE);
    let state = match fs::read_to_string(&job_file) {
      Ok(text) => serde_json::from_str::<JobState>(&text)
        .with_context(|| format!("Failed to parse job file '{}'", job_file.display()))?,
      Err(e) if e.kind() == ErrorKind::NotFound => JobState::default(),
      Err(e) => {
        return Err(e).with_context(|| format!("Failed to read job file '{}'", job_file.display()));
      }
    };
    let generation = read_generation(&temp_dir)?;
    event!(Level::DEBUG, temp_dir = %temp_dir.display(), files = state.files.len(), generation, "Job opened.");
    Ok(Self {
      temp_dir,
      files: state.files.into_iter().map(|f| (f.uri.clone(), f)).collect(),
      properties: state.properties,
      generation,
      stale: false,
    })
  }

  pub fn temp_dir(&self) -> &Path {
    &self.temp_dir
  }

  /// Generation this instance was loaded at or last wrote.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn file_info(&self, uri: &str) -> Option<&FileInfo> {
    self.files.get(uri)
  }

  pub fn file_info_mut(&mut self, uri: &str) -> Option<&mut FileInfo> {
    self.files.get_mut(uri)
  }

  /// Inserts or replaces the entry keyed by `info.uri`.
  pub fn add(&mut self, info: FileInfo) -> Option<FileInfo> {
    self.files.insert(info.uri.clone(), info)
  }

  pub fn remove(&mut self, uri: &str) -> Option<FileInfo> {
    self.files.remove(uri)
  }

  pub fn file_infos(&self) -> impl Iterator<Item = &FileInfo> {
    self.files.values()
  }

  /// Entries accepted by `predicate`, in uri order.
  pub fn file_infos_matching<'a>(&'a self, predicate: impl Fn(&FileInfo) -> bool + 'a) -> impl Iterator<Item = &'a FileInfo> + 'a {
    self.files.values().filter(move |f| predicate(f))
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  pub fn property(&self, name: &str) -> Option<&str> {
    self.properties.get(name).map(String::as_str)
  }

  pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.properties.insert(name.into(), value.into());
  }

  /// Persists the manifest and advances the generation marker.
  pub fn write(&mut self) -> Result<()> {
    fs::create_dir_all(&self.temp_dir)
      .with_context(|| format!("Failed to create temp directory '{}'", self.temp_dir.display()))?;
    let state = JobState {
      properties: self.properties.clone(),
      files: self.files.values().cloned().collect(),
    };
    let job_file = self.temp_dir.join(JOB_FILE);
    let text = serde_json::to_string_pretty(&state).context("Failed to serialize job state")?;
    fs::write(&job_file, text).with_context(|| format!("Failed to write job file '{}'", job_file.display()))?;

    let next = read_generation(&self.temp_dir)?.max(self.generation) + 1;
    let marker = self.temp_dir.join(GENERATION_FILE);
    fs::write(&marker, next.to_string())
      .with_context(|| format!("Failed to write generation marker '{}'", marker.display()))?;
    self.generation = next;
    event!(Level::DEBUG, temp_dir = %self.temp_dir.display(), generation = next, "Job written.");
    Ok(())
  }

  /// Forces the next cache lookup to rebuild this job.
  pub fn mark_stale(&mut self) {
    self.stale = true;
  }

  /// True if marked stale or if another writer advanced the on-disk generation.
  pub fn is_stale(&self) -> bool {
    if self.stale {
      return true;
    }
    match read_generation(&self.temp_dir) {
      Ok(on_disk) => on_disk != self.generation,
      Err(e) => {
        event!(Level::WARN, error = %e, "Cannot read generation marker, treating job as stale.");
        true
      }
    }
  }
}

fn read_generation(temp_dir: &Path) -> Result<u64> {
  let marker = temp_dir.join(GENERATION_FILE);
  match fs::read_to_string(&marker) {
    Ok(text) => text
      .trim()
      .parse::<u64>()
      .with_context(|| format!("Malformed generation marker '{}'", marker.display())),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
    Err(e) => Err(e).with_context(|| format!("Failed to read generation marker '{}'", marker.display())),
  }
}
