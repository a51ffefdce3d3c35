// src/lib.rs

//! Docket: a sequential document-processing pipeline invoker.
//!
//! A pipeline is an ordered list of stage declarations applied to a shared,
//! file-backed job manifest. Docket provides:
//!  - Three stage kinds: factory-resolved modules, style-sheet transforms and
//!    streaming filter chains.
//!  - `if`/`unless` gating of parameters, list files and filter entries
//!    against the host's defined properties.
//!  - A small predicate algebra selecting the manifest entries a stage sees.
//!  - Include/exclude list file resolution.
//!  - A job cache keyed by run identity that never hands out a stale manifest.

pub mod config;
pub mod core;
pub mod error;
pub mod job;
pub mod module;
pub mod pipeline;
pub mod registry;
pub mod selection;
pub mod stage;

// --- Re-exports for the Public API ---

pub use crate::config::{PipelineDeclaration, RunSettings, PROPERTY_TEMP_DIR};
pub use crate::core::context::RunContext;
pub use crate::core::param::Param;
pub use crate::core::properties::{is_active, Condition, Properties};

pub use crate::job::{FileInfo, Job, JobCache, JobHandle, RunIdentity};

pub use crate::module::{
  GenericModuleConfig, ModuleConfig, OutputMapper, SaxPipeConfig, SourceMode, XmlFilterConfig, XsltConfig,
};
pub use crate::selection::{combine, FileInfoFilter, FileInfoPredicate, IncludesFile};

pub use crate::stage::{
  PipelineModule, StageInput, StageLogger, StageOutput, TransformEngine, TransformTask, XmlFilter,
};

pub use crate::error::{DocketError, DocketResult};

// The module factory resolving implementation identifiers
pub use crate::registry::ModuleFactory;

pub use crate::pipeline::{Invoker, RunReport, StageTiming};

/*
    Typical use:
    1. Register generic stages and chain filters on a `ModuleFactory`, and set
       the transform engine if the pipeline has transform stages.
    2. Build a `PipelineDeclaration` in code or load it with
       `PipelineDeclaration::from_path`.
    3. Create an `Invoker`, optionally sharing a `JobCache` across invokers.
    4. Call `invoker.execute(&settings, &identity).await`. Any configuration
       error or stage failure ends the run with a single `DocketError`.
*/
