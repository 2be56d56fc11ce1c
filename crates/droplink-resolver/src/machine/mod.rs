//! Identifying the machine droplink is running on.

use std::env;

use droplink_core::LinkError;

use crate::ResolverResult;

/// Determine this machine's name for share locality checks.
///
/// Prefers the agent environment (`COMPUTERNAME` on Windows agents,
/// `HOSTNAME` elsewhere) and falls back to asking the operating system.
/// Failing to find a name is a configuration error: without one, every
/// non-loopback UNC path would be rejected for the wrong reason.
pub fn detect() -> ResolverResult<String> {
    let from_env = ["COMPUTERNAME", "HOSTNAME"].iter().find_map(|var| {
        env::var(var)
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    });

    let name = match from_env {
        Some(name) => name,
        None => whoami::fallible::hostname().map_err(|e| LinkError::Config {
            field: "machine name".to_string(),
            reason: format!("could not determine the hostname: {e}"),
        })?,
    };

    if name.trim().is_empty() {
        return Err(LinkError::Config {
            field: "machine name".to_string(),
            reason: "hostname is empty".to_string(),
        });
    }
    Ok(name)
}
