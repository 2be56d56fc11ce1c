//! # droplink-api
//!
//! REST client for the build service: lists the artifacts a build has
//! published so they can be materialized locally. Handles credentials,
//! transient-failure retries, and mapping the wire format into the core
//! artifact types.

pub mod api;
pub mod client;

pub use api::{ArtifactListResponse, ArtifactResource, BuildArtifact};
pub use client::{AuthConfig, BuildClient, RetryConfig};

/// Result type for build service operations
pub type ApiResult<T> = std::result::Result<T, droplink_core::LinkError>;
