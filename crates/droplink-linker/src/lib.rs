//! # droplink-linker
//!
//! The link materialization engine: turns build artifacts that live on a
//! local file share into links under a destination directory.
//!
//! [`Linker`] handles a single source, translating UNC paths through a
//! [`droplink_resolver::ShareResolver`] and choosing between a directory
//! symlink, a hard-link mirror of the tree, or a plain file hard link.
//! [`Materializer`] drives a whole build's artifact list concurrently and
//! reports every failure of a run together.

pub mod link;
pub mod materialize;

pub use link::{LinkStats, LinkTask, Linker};
pub use materialize::{LinkSummary, MaterializeOptions, Materializer};

/// Result type for linker operations
pub type LinkerResult<T> = std::result::Result<T, droplink_core::LinkError>;
