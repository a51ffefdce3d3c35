// docket/src/pipeline/mod.rs

//! Defines the `Invoker`, its initialization and the per-kind dispatch of stages.

pub mod definition;
pub(crate) mod dispatch;
pub mod execution;
pub mod report;

pub use definition::Invoker;
pub use report::{RunReport, StageTiming};
