//! Run configuration assembled from flags and the agent environment.

use camino::Utf8PathBuf;
use regex::{Regex, RegexBuilder};
use url::Url;

use droplink_api::AuthConfig;
use droplink_core::{LinkError, LinkResult};
use droplink_linker::MaterializeOptions;

use crate::Cli;

/// Validated configuration for one linking run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub project: String,
    pub build_id: u32,
    pub service_url: String,
    pub dest_dir: Utf8PathBuf,
    pub hard_links_only: bool,
    pub clean_first: bool,
    pub name_filter: Option<Regex>,
    pub auth: AuthConfig,
}

impl RunConfig {
    /// Validate the parsed command line into a run configuration.
    pub fn from_cli(cli: Cli) -> LinkResult<Self> {
        if cli.project.trim().is_empty() {
            return Err(LinkError::Config {
                field: "project".to_string(),
                reason: "project name is empty".to_string(),
            });
        }

        let service_url = Url::parse(&cli.service_url).map_err(|e| LinkError::Config {
            field: "service-url".to_string(),
            reason: format!("'{}' is not a valid URL: {e}", cli.service_url),
        })?;
        if !matches!(service_url.scheme(), "http" | "https") {
            return Err(LinkError::Config {
                field: "service-url".to_string(),
                reason: format!("unsupported scheme '{}'", service_url.scheme()),
            });
        }

        // The filter matches case-insensitively, like artifact names do.
        let name_filter = match &cli.artifact_filter {
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| LinkError::Config {
                        field: "artifact-filter".to_string(),
                        reason: format!("invalid pattern: {e}"),
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            project: cli.project,
            build_id: cli.build_id,
            service_url: cli.service_url,
            dest_dir: cli.dest,
            hard_links_only: cli.hard_links_only,
            clean_first: cli.clean,
            name_filter,
            auth: AuthConfig {
                pat: cli.pat,
                access_token: cli.access_token,
            },
        })
    }

    /// Materialization options for this run.
    pub fn materialize_options(&self) -> MaterializeOptions {
        MaterializeOptions {
            dest_dir: self.dest_dir.clone(),
            hard_links_only: self.hard_links_only,
            clean_first: self.clean_first,
            name_filter: self.name_filter.clone(),
        }
    }

    /// True when no credential was configured.
    pub fn is_anonymous(&self) -> bool {
        self.auth.pat.is_none() && self.auth.access_token.is_none()
    }
}
