// docket/src/stage/xml_filter.rs

//! Filter-chain stage: pipes each selected manifest file through the filters
//! that apply to it and writes the result back in place.

use crate::job::info::FileInfo;
use crate::selection::filter::FileInfoPredicate;
use crate::stage::{PipelineModule, StageInput, StageOutput, XmlFilter};
use anyhow::Context as AnyhowContext;
use async_trait::async_trait;
use std::fs;
use tracing::{event, instrument, Level};

/// A filter and the predicate deciding which files it sees.
pub struct FilterPair {
  pub filter: Box<dyn XmlFilter>,
  pub predicate: FileInfoPredicate,
}

impl FilterPair {
  pub fn new(filter: Box<dyn XmlFilter>, predicate: FileInfoPredicate) -> Self {
    Self { filter, predicate }
  }
}

#[derive(Default)]
pub struct XmlFilterModule {
  file_info_filter: Option<FileInfoPredicate>,
  pipe: Vec<FilterPair>,
}

impl XmlFilterModule {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_processing_pipe(&mut self, pipe: Vec<FilterPair>) {
    self.pipe = pipe;
  }

  pub fn pipe_len(&self) -> usize {
    self.pipe.len()
  }

  fn selected_files(&self, input: &StageInput) -> (std::path::PathBuf, Vec<FileInfo>) {
    let job = input.job.read();
    let files = match &self.file_info_filter {
      Some(filter) => job.file_infos_matching(|f| filter.test(f)).cloned().collect(),
      None => job.file_infos().cloned().collect(),
    };
    (job.temp_dir().to_path_buf(), files)
  }
}

#[async_trait]
impl PipelineModule for XmlFilterModule {
  fn set_file_info_filter(&mut self, filter: FileInfoPredicate) {
    self.file_info_filter = Some(filter);
  }

  #[instrument(name = "XmlFilterModule::execute", skip_all, fields(filters = self.pipe.len()))]
  async fn execute(&mut self, input: StageInput) -> anyhow::Result<StageOutput> {
    for pair in &mut self.pipe {
      pair.filter.set_attributes(&input.attributes);
    }
    let (temp_dir, files) = self.selected_files(&input);
    let mut processed = 0usize;
    for info in &files {
      let applicable: Vec<usize> = (0..self.pipe.len())
        .filter(|&i| self.pipe[i].predicate.test(info))
        .collect();
      if applicable.is_empty() {
        continue;
      }
      let path = temp_dir.join(&info.uri);
      let mut document =
        fs::read_to_string(&path).with_context(|| format!("Failed to read '{}'", path.display()))?;
      for i in applicable {
        document = self.pipe[i]
          .filter
          .filter(info, document)
          .with_context(|| format!("Filter {} failed on '{}'", i, info.uri))?;
      }
      fs::write(&path, document).with_context(|| format!("Failed to write '{}'", path.display()))?;
      processed += 1;
      event!(Level::TRACE, uri = %info.uri, "File filtered.");
    }
    input.logger.debug(&format!("Filtered {} of {} selected file(s)", processed, files.len()));
    Ok(StageOutput::default())
  }
}
