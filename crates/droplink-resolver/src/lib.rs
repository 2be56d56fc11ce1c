//! # droplink-resolver
//!
//! Resolution of UNC share paths (`\\host\share\sub\path`) to the local
//! directories backing them.
//!
//! Artifacts published to a file share are only linkable when the share is
//! hosted on the machine running the link step. [`ShareResolver`] enforces
//! that locality rule, queries the platform's share tooling through the
//! [`ShareLookup`] seam, and caches each share's root for the lifetime of
//! the resolver.

pub mod lookup;
pub mod machine;
pub mod shares;

pub use lookup::{ShareLookup, SmbShareLookup, StaticShareLookup};
pub use shares::ShareResolver;

use droplink_core::LinkError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, LinkError>;
