//! Querying the machine for the directory backing a named share.

use std::collections::HashMap;

use async_trait::async_trait;
use droplink_core::LinkError;
use tracing::debug;

use crate::ResolverResult;

/// Resolves a share name to the local directory backing it.
///
/// The production implementation shells out to the platform's share tooling.
/// Tests and benchmarks substitute a static table instead.
#[async_trait]
pub trait ShareLookup: Send + Sync {
    /// Look up the local filesystem root of `share`.
    async fn share_root(&self, share: &str) -> ResolverResult<String>;
}

/// Share lookup backed by the operating system's SMB tooling.
///
/// On Windows this asks PowerShell's `Get-SmbShare` for the share's path.
/// Elsewhere it falls back to Samba's `net usershare info`, which prints an
/// ini-style block containing a `path=` line.
#[derive(Debug, Default, Clone)]
pub struct SmbShareLookup;

impl SmbShareLookup {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ShareLookup for SmbShareLookup {
    async fn share_root(&self, share: &str) -> ResolverResult<String> {
        debug!(share, "querying system for share root");
        let output = share_query_command(share).output().await.map_err(|e| {
            LinkError::share_query(share, "failed to run the share query tool", Some(Box::new(e)))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LinkError::share_query(
                share,
                format!("share query exited with {}: {}", output.status, stderr.trim()),
                None,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let root = parse_share_root(&stdout);
        if root.is_empty() {
            return Err(LinkError::share_query(
                share,
                "share query returned no path",
                None,
            ));
        }
        Ok(root)
    }
}

#[cfg(windows)]
fn share_query_command(share: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("powershell");
    cmd.arg("-NoProfile")
        .arg("-Command")
        .arg(format!("get-smbshare '{share}' | % path"));
    cmd
}

#[cfg(not(windows))]
fn share_query_command(share: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("net");
    cmd.arg("usershare").arg("info").arg(share);
    cmd
}

/// Extract the share root from the query tool's stdout. PowerShell prints
/// the bare path, `net usershare info` an ini-style `path=` line.
fn parse_share_root(stdout: &str) -> String {
    for line in stdout.lines() {
        if let Some(path) = line.trim().strip_prefix("path=") {
            return path.trim().to_string();
        }
    }
    stdout.trim().to_string()
}

/// Share lookup backed by a fixed table.
///
/// Exported so integration tests and benchmarks can resolve shares without
/// touching system tooling. Share names match case-insensitively, the same
/// way the platform tools match them.
#[derive(Debug, Default)]
pub struct StaticShareLookup {
    shares: HashMap<String, String>,
}

impl StaticShareLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a share by name.
    pub fn with_share(mut self, name: &str, root: impl Into<String>) -> Self {
        self.shares.insert(name.to_lowercase(), root.into());
        self
    }
}

#[async_trait]
impl ShareLookup for StaticShareLookup {
    async fn share_root(&self, share: &str) -> ResolverResult<String> {
        self.shares
            .get(&share.to_lowercase())
            .cloned()
            .ok_or_else(|| LinkError::share_query(share, "share is not registered", None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_path_output() {
        assert_eq!(parse_share_root("D:\\shares\\artifacts\r\n"), "D:\\shares\\artifacts");
    }

    #[test]
    fn parses_usershare_info_block() {
        let stdout = "[artifacts]\npath=/srv/shares/artifacts\ncomment=\nguest_ok=n\n";
        assert_eq!(parse_share_root(stdout), "/srv/shares/artifacts");
    }

    #[test]
    fn empty_output_parses_to_empty() {
        assert_eq!(parse_share_root("\n  \n"), "");
    }

    #[tokio::test]
    async fn static_lookup_matches_case_insensitively() {
        let lookup = StaticShareLookup::new().with_share("Artifacts", "/srv/artifacts");
        assert_eq!(lookup.share_root("artifacts").await.unwrap(), "/srv/artifacts");
        assert_eq!(lookup.share_root("ARTIFACTS").await.unwrap(), "/srv/artifacts");
    }

    #[tokio::test]
    async fn static_lookup_rejects_unknown_share() {
        let lookup = StaticShareLookup::new();
        let err = lookup.share_root("missing").await.unwrap_err();
        assert!(matches!(err, LinkError::ShareQuery { .. }));
    }
}
