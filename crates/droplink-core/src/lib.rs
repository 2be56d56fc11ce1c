//! # droplink-core
//!
//! Core types shared across the droplink workspace: the unified error type,
//! build artifact data types, and UNC path classification.
//!
//! Everything here is pure data handling. Share lookup, filesystem work and
//! service calls live in the sibling crates.

pub mod error;
pub mod types;
pub mod unc;

pub use error::{ArtifactFailure, LinkError, LinkResult};
pub use types::{Artifact, ArtifactKind};
pub use unc::{SourcePath, UncPath};
