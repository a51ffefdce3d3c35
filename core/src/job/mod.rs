// docket/src/job/mod.rs

//! The job manifest shared by all stages of a run, and its cache.

pub mod cache;
pub mod handle;
pub mod info;
pub mod store;

pub use cache::{JobCache, RunIdentity};
pub use handle::JobHandle;
pub use info::{FileInfo, FORMAT_DITA, FORMAT_DITAMAP};
pub use store::Job;
