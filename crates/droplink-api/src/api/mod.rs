//! Build service API response types

use droplink_core::{Artifact, ArtifactKind};
use serde::{Deserialize, Serialize};

/// Response envelope for the artifact listing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactListResponse {
    /// Number of artifacts in the response
    pub count: u32,
    /// The artifacts themselves
    pub value: Vec<BuildArtifact>,
}

/// One artifact published by a build
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildArtifact {
    /// Artifact id assigned by the build service
    #[serde(default)]
    pub id: Option<u64>,
    /// Artifact name, unique within the build
    pub name: String,
    /// Where and how the artifact is stored
    #[serde(default)]
    pub resource: ArtifactResource,
}

/// Storage location of a build artifact
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtifactResource {
    /// Resource type, "filepath" for file share artifacts
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    /// Location data, a share path for file share artifacts
    #[serde(default)]
    pub data: Option<String>,
    /// API URL of the resource
    #[serde(default)]
    pub url: Option<String>,
    /// Direct download URL, if the service offers one
    #[serde(rename = "downloadUrl", default)]
    pub download_url: Option<String>,
}

impl BuildArtifact {
    /// Convert the wire representation into the core artifact type.
    pub fn into_artifact(self) -> Artifact {
        let kind = match self.resource.resource_type.as_deref() {
            Some(tag) => ArtifactKind::from_resource_type(tag),
            None => ArtifactKind::Other("unknown".to_string()),
        };
        Artifact {
            name: self.name,
            kind,
            source_data: self.resource.data.unwrap_or_default(),
        }
    }
}
