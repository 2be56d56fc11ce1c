//! Build artifact types.

use std::fmt;

use crate::unc;

/// Resource kind of a published build artifact.
///
/// Only [`ArtifactKind::FileShare`] artifacts live on a file share and can be
/// materialized as links. Every other kind (container, pipeline artifact, ...)
/// is carried through so it can be reported, then skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Published to a file share, `resource.data` holds the share path.
    FileShare,
    /// Any other resource type, kept verbatim for reporting.
    Other(String),
}

impl ArtifactKind {
    /// Map the build service's `resource.type` tag, case-insensitively.
    pub fn from_resource_type(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("filepath") {
            Self::FileShare
        } else {
            Self::Other(tag.to_string())
        }
    }

    pub fn is_file_share(&self) -> bool {
        matches!(self, Self::FileShare)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileShare => write!(f, "filepath"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// A build artifact as reported by the build service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact name, also the directory name under the share root.
    pub name: String,
    /// Resource kind, decides whether the artifact can be linked.
    pub kind: ArtifactKind,
    /// The `resource.data` field: share path or opaque locator.
    pub source_data: String,
}

impl Artifact {
    /// Construct a file share artifact. Mostly useful in tests and benches.
    pub fn file_share(name: impl Into<String>, source_data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArtifactKind::FileShare,
            source_data: source_data.into(),
        }
    }

    /// Full source path of this artifact: `source_data` joined with `name`,
    /// backslash-style when the data is UNC shaped.
    pub fn full_source_path(&self) -> String {
        unc::join_source(&self.source_data, &self.name)
    }
}
