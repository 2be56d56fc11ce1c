//! Materializing a whole build's artifacts as links.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use droplink_core::{Artifact, ArtifactFailure, LinkError};

use crate::link::linker::remove_entry;
use crate::link::{LinkStats, LinkTask, Linker};
use crate::LinkerResult;

/// How a build's artifacts should be materialized.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Directory the links are created in.
    pub dest_dir: Utf8PathBuf,
    /// Mirror directories with hard links instead of symlinking them.
    pub hard_links_only: bool,
    /// Empty the destination directory before linking.
    pub clean_first: bool,
    /// Only link artifacts whose name matches.
    pub name_filter: Option<Regex>,
}

impl MaterializeOptions {
    /// Options with everything off except the destination.
    pub fn new(dest_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            hard_links_only: false,
            clean_first: false,
            name_filter: None,
        }
    }
}

/// Result of materializing one build's artifacts.
#[derive(Debug, Default)]
pub struct LinkSummary {
    /// Artifacts that were linked, with their per-artifact counters.
    pub linked: Vec<(String, LinkStats)>,
    /// Artifacts skipped because of their kind or the name filter.
    pub skipped: Vec<String>,
    /// Aggregate counters across all linked artifacts.
    pub totals: LinkStats,
}

/// Orchestrates linking every artifact of a build.
pub struct Materializer {
    linker: Linker,
}

impl Materializer {
    pub fn new(linker: Linker) -> Self {
        Self { linker }
    }

    /// Link all eligible artifacts into the destination directory.
    ///
    /// Artifacts are linked concurrently. A failing artifact never stops the
    /// others; every failure is collected and reported together at the end.
    pub async fn link_artifacts(
        &self,
        artifacts: Vec<Artifact>,
        options: &MaterializeOptions,
    ) -> LinkerResult<LinkSummary> {
        if options.clean_first {
            info!(dest = %options.dest_dir, "cleaning destination directory");
            empty_dir(&options.dest_dir).await?;
        }

        let mut summary = LinkSummary::default();
        let tasks = plan(artifacts, options, &mut summary.skipped);
        let attempted = tasks.len();

        let mut in_flight: JoinSet<(String, LinkerResult<LinkStats>)> = JoinSet::new();
        for task in tasks {
            let linker = self.linker.clone();
            let hard_links_only = options.hard_links_only;
            in_flight.spawn(async move {
                let result = linker
                    .make_link(&task.source, &task.dest_dir, &task.dest_name, hard_links_only)
                    .await;
                (task.dest_name, result)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok((name, Ok(stats))) => {
                    info!(artifact = %name, links = stats.total_links(), "artifact linked");
                    summary.totals.merge(&stats);
                    summary.linked.push((name, stats));
                }
                Ok((name, Err(error))) => {
                    warn!(artifact = %name, error = %error, "artifact failed to link");
                    failures.push(ArtifactFailure {
                        artifact: name,
                        error,
                    });
                }
                Err(join_error) => {
                    failures.push(ArtifactFailure {
                        artifact: "unknown".to_string(),
                        error: LinkError::io(
                            "artifact worker stopped unexpectedly",
                            std::io::Error::new(std::io::ErrorKind::Other, join_error.to_string()),
                        ),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(LinkError::LinkRun {
                attempted,
                failures,
            })
        }
    }
}

/// Decide which artifacts get linked and build their tasks.
fn plan(
    artifacts: Vec<Artifact>,
    options: &MaterializeOptions,
    skipped: &mut Vec<String>,
) -> Vec<LinkTask> {
    let mut tasks = Vec::new();
    for artifact in artifacts {
        if !artifact.kind.is_file_share() {
            debug!(
                artifact = %artifact.name,
                kind = %artifact.kind,
                "skipping artifact, not on a file share"
            );
            skipped.push(artifact.name);
            continue;
        }
        if let Some(filter) = &options.name_filter {
            if !filter.is_match(&artifact.name) {
                debug!(
                    artifact = %artifact.name,
                    "skipping artifact, name does not match the filter"
                );
                skipped.push(artifact.name);
                continue;
            }
        }
        tasks.push(LinkTask {
            source: artifact.full_source_path(),
            dest_dir: options.dest_dir.clone(),
            dest_name: artifact.name,
        });
    }
    tasks
}

/// Empty a directory without removing the directory itself, creating it
/// when missing.
async fn empty_dir(dir: &Utf8Path) -> LinkerResult<()> {
    let cleanup_err = |e: std::io::Error| LinkError::DestinationCleanup {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return tokio::fs::create_dir_all(dir).await.map_err(cleanup_err);
        }
        Err(e) => return Err(cleanup_err(e)),
    };

    loop {
        let Some(entry) = entries.next_entry().await.map_err(cleanup_err)? else {
            return Ok(());
        };
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| LinkError::PathEncoding { path: p })?;
        let file_type = entry.file_type().await.map_err(cleanup_err)?;
        remove_entry(&path, file_type)
            .await
            .map_err(|e| LinkError::DestinationCleanup {
                path: path.clone(),
                source: e,
            })?;
    }
}
