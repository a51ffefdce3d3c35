// tests/job_tests.rs
mod common;

use common::*;
use docket::job::store::{GENERATION_FILE, JOB_FILE};
use docket::{DocketError, FileInfo, Job, JobCache, RunIdentity};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_open_empty_temp_dir() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let job = Job::open(dir.path()).unwrap();
  assert!(job.is_empty());
  assert_eq!(job.generation(), 0);
  assert!(!job.is_stale());
}

#[test]
fn test_write_and_reopen() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let mut job = Job::open(dir.path()).unwrap();
  job.add(FileInfo::new("topics/a.dita").with_format("dita").input(true));
  job.add(FileInfo::new("root.ditamap").with_format("ditamap").with_conref(true));
  job.set_property("transtype", "html5");
  job.write().unwrap();
  assert!(dir.path().join(JOB_FILE).exists());
  assert_eq!(fs::read_to_string(dir.path().join(GENERATION_FILE)).unwrap().trim(), "1");

  let reopened = Job::open(dir.path()).unwrap();
  assert_eq!(reopened.len(), 2);
  assert_eq!(reopened.generation(), 1);
  assert_eq!(reopened.property("transtype"), Some("html5"));
  let map = reopened.file_info("root.ditamap").unwrap();
  assert!(map.has_conref);
  assert_eq!(map.format.as_deref(), Some("ditamap"));
  assert!(reopened.file_info("topics/a.dita").unwrap().is_input);
}

#[test]
fn test_matching_is_in_uri_order() {
  let dir = TempDir::new().unwrap();
  let mut job = Job::open(dir.path()).unwrap();
  job.add(FileInfo::new("c.dita").with_format("dita"));
  job.add(FileInfo::new("a.dita").with_format("dita"));
  job.add(FileInfo::new("b.png"));
  let uris: Vec<&str> = job.file_infos_matching(|f| f.format.is_some()).map(|f| f.uri.as_str()).collect();
  assert_eq!(uris, vec!["a.dita", "c.dita"]);
}

#[test]
fn test_other_writer_makes_job_stale() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let mut first = Job::open(dir.path()).unwrap();
  first.write().unwrap();
  assert!(!first.is_stale());

  let mut second = Job::open(dir.path()).unwrap();
  second.add(FileInfo::new("x.dita"));
  second.write().unwrap();

  assert!(first.is_stale());
  assert!(!second.is_stale());
  assert_eq!(second.generation(), 2);
}

#[test]
fn test_malformed_job_file_is_an_error() {
  let dir = TempDir::new().unwrap();
  fs::write(dir.path().join(JOB_FILE), "{ not json").unwrap();
  assert!(Job::open(dir.path()).is_err());
}

#[test]
fn test_cache_returns_same_instance() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let cache = JobCache::new();
  let id = RunIdentity::new("session-1");

  let a = cache.get_or_create(dir.path(), &id).unwrap();
  let b = cache.get_or_create(dir.path(), &id).unwrap();
  assert!(a.ptr_eq(&b));
  assert_eq!(cache.len(), 1);

  let other = cache.get_or_create(dir.path(), &RunIdentity::new("session-2")).unwrap();
  assert!(!a.ptr_eq(&other));
  assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_never_returns_stale_job() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  let cache = JobCache::new();
  let id = RunIdentity::from("session");

  let first = cache.get_or_create(dir.path(), &id).unwrap();
  first.mark_stale();
  let second = cache.get_or_create(dir.path(), &id).unwrap();
  assert!(!first.ptr_eq(&second));
  assert!(!second.is_stale());

  // A write from outside the cache makes the cached instance stale too.
  let mut outside = Job::open(dir.path()).unwrap();
  outside.add(FileInfo::new("new.dita"));
  outside.write().unwrap();
  let third = cache.get_or_create(dir.path(), &id).unwrap();
  assert!(!second.ptr_eq(&third));
  assert!(third.read().file_info("new.dita").is_some());
}

#[test]
fn test_own_writes_keep_cached_job_fresh() {
  let dir = TempDir::new().unwrap();
  let cache = JobCache::new();
  let id = RunIdentity::from("session");

  let job = cache.get_or_create(dir.path(), &id).unwrap();
  job.write().add(FileInfo::new("a.dita"));
  job.write().write().unwrap();
  let again = cache.get_or_create(dir.path(), &id).unwrap();
  assert!(job.ptr_eq(&again));
}

#[test]
fn test_invalidate() {
  let dir = TempDir::new().unwrap();
  let cache = JobCache::new();
  let id = RunIdentity::from("session");
  let job = cache.get_or_create(dir.path(), &id).unwrap();

  assert!(cache.invalidate(&id).unwrap().ptr_eq(&job));
  assert!(cache.get(&id).is_none());
  assert!(cache.invalidate(&id).is_none());
  assert!(cache.is_empty());
}

#[test]
fn test_unloadable_job_is_job_init_error() {
  setup_tracing();
  let dir = TempDir::new().unwrap();
  fs::write(dir.path().join(JOB_FILE), "42").unwrap();
  let cache = JobCache::new();

  match cache.get_or_create(dir.path(), &RunIdentity::from("s")) {
    Err(DocketError::JobInit { temp_dir, .. }) => assert_eq!(temp_dir, dir.path()),
    other => panic!("Expected JobInit error, got {:?}", other.map(|_| ())),
  }
  assert!(cache.is_empty());
}
