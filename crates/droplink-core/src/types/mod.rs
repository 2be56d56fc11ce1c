//! Core data types shared across the workspace.

mod artifact;

pub use artifact::{Artifact, ArtifactKind};
