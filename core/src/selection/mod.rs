// docket/src/selection/mod.rs

//! Choosing which files a stage works on: manifest predicates and list files.

pub mod file_list;
pub mod filter;

pub use file_list::{read_list_files, resolve, IncludesFile};
pub use filter::{combine, default_format_filters, FileInfoFilter, FileInfoPredicate};
