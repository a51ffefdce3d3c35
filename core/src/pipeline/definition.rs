// docket/src/pipeline/definition.rs

//! Contains the `Invoker` struct and its construction.

use crate::config::PipelineDeclaration;
use crate::core::param::Param;
use crate::job::cache::JobCache;
use crate::module::ModuleConfig;
use crate::registry::ModuleFactory;
use std::sync::Arc;

/// Runs a pipeline declaration, stage by stage, against a shared job.
///
/// The factory and the job cache are shared handles so several invokers (for
/// instance one per build target) can reuse registrations and cached jobs.
pub struct Invoker {
  pub(crate) declaration: PipelineDeclaration,
  pub(crate) factory: Arc<ModuleFactory>,
  pub(crate) jobs: Arc<JobCache>,
}

impl Invoker {
  pub fn new(declaration: PipelineDeclaration, factory: Arc<ModuleFactory>) -> Self {
    Self {
      declaration,
      factory,
      jobs: Arc::new(JobCache::new()),
    }
  }

  /// Uses `jobs` instead of a private cache.
  pub fn with_job_cache(mut self, jobs: Arc<JobCache>) -> Self {
    self.jobs = jobs;
    self
  }

  pub fn add_param(&mut self, param: Param) {
    self.declaration.params.push(param);
  }

  pub fn add_module(&mut self, module: impl Into<ModuleConfig>) {
    self.declaration.modules.push(module.into());
  }

  pub fn declaration(&self) -> &PipelineDeclaration {
    &self.declaration
  }

  pub fn factory(&self) -> &Arc<ModuleFactory> {
    &self.factory
  }

  pub fn job_cache(&self) -> &Arc<JobCache> {
    &self.jobs
  }
}
