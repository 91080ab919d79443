//! Conversion jobs: resolving a selection and running it to completion.

pub mod resolver;
mod runner;

pub use resolver::{resolve_paths, Resolution, SkipNotice};
pub use runner::{FileOutcome, JobRunner};
