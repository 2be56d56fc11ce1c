//! Link creation with an explicit worklist instead of call-stack recursion.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use droplink_core::LinkError;
use droplink_resolver::ShareResolver;

use crate::LinkerResult;

/// Default number of directory workers mirroring a tree at once.
pub const DEFAULT_FAN_OUT: usize = 16;

/// Counters describing what a link operation created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkStats {
    /// Directory symlinks created.
    pub symlinks_created: usize,
    /// Hard links created.
    pub hard_links_created: usize,
    /// Directories created while mirroring.
    pub directories_created: usize,
    /// Pre-existing destinations that were removed first.
    pub destinations_replaced: usize,
}

impl LinkStats {
    /// Fold another operation's counters into this one.
    pub fn merge(&mut self, other: &LinkStats) {
        self.symlinks_created += other.symlinks_created;
        self.hard_links_created += other.hard_links_created;
        self.directories_created += other.directories_created;
        self.destinations_replaced += other.destinations_replaced;
    }

    /// Links of either flavor.
    pub fn total_links(&self) -> usize {
        self.symlinks_created + self.hard_links_created
    }
}

/// Materializes a single source as a link at a destination.
///
/// Directories become a symlink to the source by default, or a hard-link
/// mirror of the whole tree when `hard_links_only` is set. Plain files
/// always become hard links. An existing destination is removed first.
#[derive(Clone)]
pub struct Linker {
    resolver: Arc<ShareResolver>,
    fan_out: usize,
}

impl Linker {
    /// Create a linker with the default mirroring fan-out.
    pub fn new(resolver: Arc<ShareResolver>) -> Self {
        Self::with_fan_out(resolver, DEFAULT_FAN_OUT)
    }

    /// Create a linker with a custom mirroring fan-out (minimum 1).
    pub fn with_fan_out(resolver: Arc<ShareResolver>, fan_out: usize) -> Self {
        Self {
            resolver,
            fan_out: fan_out.max(1),
        }
    }

    /// Materialize `source` as `dest_dir/dest_name`.
    ///
    /// The source may be a UNC share path; it is resolved to a local path
    /// first. Missing ancestors of the destination are created, and anything
    /// already sitting at the destination is removed before linking.
    pub async fn make_link(
        &self,
        source: &str,
        dest_dir: &Utf8Path,
        dest_name: &str,
        hard_links_only: bool,
    ) -> LinkerResult<LinkStats> {
        let resolved = self.resolver.resolve(source).await?;

        // Follows symlinks on purpose: a symlink source is usable as long
        // as its target exists.
        let exists = tokio::fs::try_exists(&resolved)
            .await
            .map_err(|e| LinkError::io(format!("failed to probe {resolved}"), e))?;
        if !exists {
            return Err(LinkError::SourceNotFound { path: resolved });
        }

        let dest = dest_dir.join(dest_name);

        // dest_name can carry path separators; every ancestor of the
        // joined destination must exist, not just dest_dir.
        let dest_parent = dest.parent().unwrap_or(dest_dir);
        tokio::fs::create_dir_all(dest_parent)
            .await
            .map_err(|e| LinkError::io(format!("failed to create {dest_parent}"), e))?;

        let mut stats = LinkStats::default();

        match tokio::fs::symlink_metadata(&dest).await {
            Ok(meta) => {
                warn!(dest = %dest, "removing existing destination before linking");
                remove_entry(&dest, meta.file_type()).await.map_err(|e| {
                    LinkError::DestinationCleanup {
                        path: dest.clone(),
                        source: e,
                    }
                })?;
                stats.destinations_replaced += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LinkError::DestinationCleanup {
                    path: dest,
                    source: e,
                })
            }
        }

        let meta = tokio::fs::symlink_metadata(&resolved)
            .await
            .map_err(|e| LinkError::io(format!("failed to stat {resolved}"), e))?;

        if meta.is_dir() && !hard_links_only {
            debug!(from = %resolved, to = %dest, "creating directory symlink");
            symlink_dir(&resolved, &dest)
                .await
                .map_err(|e| LinkError::io(format!("failed to symlink {resolved} to {dest}"), e))?;
            stats.symlinks_created += 1;
        } else if meta.is_dir() {
            debug!(from = %resolved, to = %dest, "mirroring directory with hard links");
            let mirrored = self.mirror_tree(resolved, dest).await?;
            stats.merge(&mirrored);
        } else {
            debug!(from = %resolved, to = %dest, "creating hard link");
            tokio::fs::hard_link(&resolved, &dest)
                .await
                .map_err(|e| {
                    LinkError::io(format!("failed to hard link {resolved} to {dest}"), e)
                })?;
            stats.hard_links_created += 1;
        }

        Ok(stats)
    }

    /// Mirror a directory tree with hard links.
    ///
    /// Directories are processed by a bounded pool of workers fed from an
    /// explicit worklist, so tree depth never translates into stack depth.
    /// A parent directory is always created before its children are
    /// scheduled. On the first error no new directories are scheduled, but
    /// workers already in flight are allowed to settle.
    async fn mirror_tree(&self, source: Utf8PathBuf, dest: Utf8PathBuf) -> LinkerResult<LinkStats> {
        let mut stats = LinkStats::default();

        tokio::fs::create_dir_all(&dest)
            .await
            .map_err(|e| LinkError::io(format!("failed to create {dest}"), e))?;
        stats.directories_created += 1;

        let mut pending: VecDeque<(Utf8PathBuf, Utf8PathBuf)> = VecDeque::new();
        pending.push_back((source, dest));

        let mut in_flight: JoinSet<LinkerResult<DirOutcome>> = JoinSet::new();
        let mut first_error: Option<LinkError> = None;

        loop {
            while first_error.is_none() && in_flight.len() < self.fan_out {
                match pending.pop_front() {
                    Some((src, dst)) => {
                        in_flight.spawn(mirror_dir(self.resolver.clone(), src, dst));
                    }
                    None => break,
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match joined {
                Ok(Ok(outcome)) => {
                    stats.hard_links_created += outcome.files_linked;
                    stats.directories_created += outcome.dirs_created;
                    if first_error.is_none() {
                        pending.extend(outcome.subdirs);
                    }
                }
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        pending.clear();
                        first_error = Some(error);
                    } else {
                        warn!(error = %error, "further failure while mirroring settles");
                    }
                }
                Err(join_error) => {
                    let error = LinkError::io(
                        "directory worker stopped unexpectedly",
                        io::Error::new(io::ErrorKind::Other, join_error.to_string()),
                    );
                    if first_error.is_none() {
                        pending.clear();
                        first_error = Some(error);
                    } else {
                        warn!(error = %error, "further failure while mirroring settles");
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(stats),
        }
    }
}

/// Outcome of mirroring a single directory level.
struct DirOutcome {
    files_linked: usize,
    dirs_created: usize,
    subdirs: Vec<(Utf8PathBuf, Utf8PathBuf)>,
}

/// Hard-link the files of one directory, create its immediate
/// subdirectories, and hand the subdirectories back for scheduling.
async fn mirror_dir(
    resolver: Arc<ShareResolver>,
    source: Utf8PathBuf,
    dest: Utf8PathBuf,
) -> LinkerResult<DirOutcome> {
    let mut outcome = DirOutcome {
        files_linked: 0,
        dirs_created: 0,
        subdirs: Vec::new(),
    };

    let mut entries = tokio::fs::read_dir(&source)
        .await
        .map_err(|e| LinkError::io(format!("failed to read directory {source}"), e))?;

    loop {
        let entry = entries
            .next_entry()
            .await
            .map_err(|e| LinkError::io(format!("failed to read directory {source}"), e))?;
        let Some(entry) = entry else { break };

        let name = entry.file_name();
        let name = match name.to_str() {
            Some(name) => name.to_owned(),
            None => {
                return Err(LinkError::PathEncoding { path: entry.path() });
            }
        };
        // A tree can reference further shares; local paths come back
        // from the resolver unchanged.
        let child_source = resolver.resolve(source.join(&name).as_str()).await?;
        let child_dest = dest.join(&name);

        // Does not follow symlinks: a symlink in the tree is hard-linked
        // like any other non-directory entry.
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| LinkError::io(format!("failed to stat {child_source}"), e))?;

        if file_type.is_dir() {
            tokio::fs::create_dir_all(&child_dest)
                .await
                .map_err(|e| LinkError::io(format!("failed to create {child_dest}"), e))?;
            outcome.dirs_created += 1;
            outcome.subdirs.push((child_source, child_dest));
        } else {
            tokio::fs::hard_link(&child_source, &child_dest)
                .await
                .map_err(|e| {
                    LinkError::io(
                        format!("failed to hard link {child_source} to {child_dest}"),
                        e,
                    )
                })?;
            outcome.files_linked += 1;
        }
    }

    Ok(outcome)
}

/// Remove whatever sits at `path`, using the removal call its file type
/// needs.
pub(crate) async fn remove_entry(path: &Utf8Path, file_type: std::fs::FileType) -> io::Result<()> {
    if file_type.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else if file_type.is_symlink() {
        remove_symlink(path).await
    } else {
        tokio::fs::remove_file(path).await
    }
}

#[cfg(unix)]
async fn remove_symlink(path: &Utf8Path) -> io::Result<()> {
    tokio::fs::remove_file(path).await
}

#[cfg(windows)]
async fn remove_symlink(path: &Utf8Path) -> io::Result<()> {
    // Directory symlinks need the directory removal call on Windows.
    match tokio::fs::remove_dir(path).await {
        Ok(()) => Ok(()),
        Err(_) => tokio::fs::remove_file(path).await,
    }
}

#[cfg(unix)]
async fn symlink_dir(source: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    tokio::fs::symlink(source, dest).await
}

#[cfg(windows)]
async fn symlink_dir(source: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    tokio::fs::symlink_dir(source, dest).await
}
