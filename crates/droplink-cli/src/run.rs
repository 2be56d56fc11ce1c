//! One linking run: list the build's artifacts and materialize them.

use std::sync::Arc;

use tracing::{debug, info};

use droplink_api::BuildClient;
use droplink_core::LinkResult;
use droplink_linker::{LinkStats, Linker, Materializer};
use droplink_resolver::{machine, ShareResolver, SmbShareLookup};

use crate::config::RunConfig;
use crate::output::OutputHandler;

/// Execute a full linking run against the configured build.
pub async fn execute(config: RunConfig) -> LinkResult<()> {
    let out = OutputHandler::new();

    let machine_name = machine::detect()?;
    debug!(machine = %machine_name, "machine identity resolved");

    if config.is_anonymous() {
        out.warn("no credentials configured, calling the build service anonymously");
    }

    out.step(
        "🔗",
        &format!(
            "Linking artifacts of build {} in {} to {}",
            config.build_id, config.project, config.dest_dir
        ),
    );

    let client = BuildClient::with_auth(config.service_url.as_str(), config.auth.clone())?;
    let artifacts = client
        .get_artifacts(&config.project, config.build_id)
        .await?;
    info!(count = artifacts.len(), "artifact list fetched");
    if artifacts.is_empty() {
        out.warn("the build has no artifacts");
    }

    let resolver = ShareResolver::new(machine_name, Arc::new(SmbShareLookup::new()));
    let materializer = Materializer::new(Linker::new(Arc::new(resolver)));
    let options = config.materialize_options();

    let summary = materializer.link_artifacts(artifacts, &options).await?;

    let mut linked = summary.linked;
    linked.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, stats) in &linked {
        out.success(&format!("{name}: {}", describe(stats)));
    }
    for name in &summary.skipped {
        out.info(&format!("skipped {name}"));
    }

    out.success(&format!(
        "{} of {} artifacts linked into {}",
        linked.len(),
        linked.len() + summary.skipped.len(),
        config.dest_dir
    ));
    Ok(())
}

/// One-line description of what an artifact became.
fn describe(stats: &LinkStats) -> String {
    if stats.symlinks_created > 0 {
        "symlinked".to_string()
    } else if stats.directories_created > 0 {
        format!(
            "{} hard links across {} directories",
            stats.hard_links_created, stats.directories_created
        )
    } else {
        "hard linked".to_string()
    }
}
