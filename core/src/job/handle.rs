// docket/src/job/handle.rs
use crate::job::store::Job;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared handle to a [`Job`], cloned into every stage of a run.
///
/// Stages run one after another, so the lock is never contended within a run.
/// Guards are blocking and MUST NOT be held across `.await` points.
#[derive(Debug)]
pub struct JobHandle(Arc<RwLock<Job>>);

impl JobHandle {
  pub fn new(job: Job) -> Self {
    JobHandle(Arc::new(RwLock::new(job)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, Job> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, Job> {
    self.0.write()
  }

  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Job>> {
    self.0.try_read()
  }

  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, Job>> {
    self.0.try_write()
  }

  // e.g. handle.map_read(|job| job.temp_dir())
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&Job) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  pub fn map_write<F, U: ?Sized>(&self, f: F) -> MappedRwLockWriteGuard<'_, U>
  where
    F: FnOnce(&mut Job) -> &mut U,
  {
    RwLockWriteGuard::map(self.write(), f)
  }

  /// True if both handles point at the same job instance.
  pub fn ptr_eq(&self, other: &JobHandle) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  pub fn is_stale(&self) -> bool {
    self.read().is_stale()
  }

  pub fn mark_stale(&self) {
    self.write().mark_stale();
  }
}

impl Clone for JobHandle {
  fn clone(&self) -> Self {
    JobHandle(Arc::clone(&self.0))
  }
}
