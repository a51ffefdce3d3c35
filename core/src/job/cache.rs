// docket/src/job/cache.rs

//! Process-wide cache of job manifests keyed by run identity.

use crate::error::{DocketError, DocketResult};
use crate::job::handle::JobHandle;
use crate::job::store::Job;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{event, instrument, Level};

/// Caller-supplied token identifying one logical run, e.g. a host session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunIdentity(String);

impl RunIdentity {
  pub fn new(id: impl Into<String>) -> Self {
    RunIdentity(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for RunIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RunIdentity {
  fn from(id: &str) -> Self {
    RunIdentity::new(id)
  }
}

impl From<String> for RunIdentity {
  fn from(id: String) -> Self {
    RunIdentity(id)
  }
}

/// At most one live job per identity. Stale jobs are dropped on lookup.
#[derive(Default)]
pub struct JobCache {
  jobs: Mutex<HashMap<RunIdentity, JobHandle>>,
}

impl JobCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the job bound to `identity`, building a fresh one rooted at
  /// `temp_dir` if none is cached or the cached one is stale.
  #[instrument(name = "JobCache::get_or_create", skip(self, temp_dir), fields(temp_dir = %temp_dir.display()), err(Display))]
  pub fn get_or_create(&self, temp_dir: &Path, identity: &RunIdentity) -> DocketResult<JobHandle> {
    let mut jobs = self.jobs.lock();
    if let Some(existing) = jobs.get(identity) {
      if existing.is_stale() {
        event!(Level::DEBUG, "Reload stale job configuration reference.");
        jobs.remove(identity);
      } else {
        event!(Level::TRACE, "Reusing cached job.");
        return Ok(existing.clone());
      }
    }

    let job = Job::open(temp_dir).map_err(|source| DocketError::JobInit {
      temp_dir: temp_dir.to_path_buf(),
      source,
    })?;
    let handle = JobHandle::new(job);
    jobs.insert(identity.clone(), handle.clone());
    event!(Level::DEBUG, "Job created and bound to run identity.");
    Ok(handle)
  }

  /// The cached job for `identity`, stale or not.
  pub fn get(&self, identity: &RunIdentity) -> Option<JobHandle> {
    self.jobs.lock().get(identity).cloned()
  }

  /// Drops the job bound to `identity`, returning it if there was one.
  pub fn invalidate(&self, identity: &RunIdentity) -> Option<JobHandle> {
    let removed = self.jobs.lock().remove(identity);
    if removed.is_some() {
      event!(Level::DEBUG, %identity, "Job reference cleared.");
    }
    removed
  }

  pub fn len(&self) -> usize {
    self.jobs.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.jobs.lock().is_empty()
  }
}
