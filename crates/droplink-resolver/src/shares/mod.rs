//! Translating UNC share paths to their local filesystem roots.

use std::sync::Arc;

use camino::Utf8PathBuf;
use dashmap::DashMap;
use droplink_core::{LinkError, SourcePath, UncPath};
use tracing::debug;

use crate::lookup::ShareLookup;
use crate::ResolverResult;

/// Resolves UNC paths against the shares hosted on this machine.
///
/// Each distinct share name is queried at most once per resolver instance;
/// results are cached under the lowercased share name. Safe to share across
/// tasks behind an [`Arc`].
pub struct ShareResolver {
    machine_name: String,
    lookup: Arc<dyn ShareLookup>,
    roots: DashMap<String, Utf8PathBuf>,
}

impl ShareResolver {
    /// Create a resolver for the machine named `machine_name`.
    pub fn new(machine_name: impl Into<String>, lookup: Arc<dyn ShareLookup>) -> Self {
        Self {
            machine_name: machine_name.into(),
            lookup,
            roots: DashMap::new(),
        }
    }

    /// Translate `file_path` into a path usable on this machine.
    ///
    /// Non-UNC paths pass through untouched. UNC paths must name this
    /// machine (or loopback) as host; the share segment is resolved to its
    /// backing directory and the remainder is re-joined onto it.
    pub async fn resolve(&self, file_path: &str) -> ResolverResult<Utf8PathBuf> {
        match SourcePath::parse(file_path) {
            SourcePath::Local(path) => Ok(path),
            SourcePath::Unc(unc) => {
                if !unc.is_local_to(&self.machine_name) {
                    return Err(LinkError::NonLocalShare {
                        path: file_path.to_string(),
                    });
                }
                let root = self.share_root(&unc).await?;
                let resolved = unc.join_sub_path(&root);
                debug!(from = %file_path, to = %resolved, "resolved share path");
                Ok(resolved)
            }
        }
    }

    /// Cached root of a share, querying the lookup on first use.
    ///
    /// Two tasks racing on a cold share may both query; they get the same
    /// answer and the last insert wins.
    async fn share_root(&self, unc: &UncPath) -> ResolverResult<Utf8PathBuf> {
        let key = unc.share_key();
        if let Some(root) = self.roots.get(&key) {
            return Ok(root.clone());
        }

        let raw = self.lookup.share_root(&unc.share).await?;
        let root = Utf8PathBuf::from(raw.trim());
        if root.as_str().is_empty() {
            return Err(LinkError::share_query(
                unc.share.as_str(),
                "share has no backing path",
                None,
            ));
        }
        debug!(share = %unc.share, root = %root, "share root queried");
        self.roots.insert(key, root.clone());
        Ok(root)
    }
}

#[cfg(test)]
mod tests;
