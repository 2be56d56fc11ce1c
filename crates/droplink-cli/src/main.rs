//! # droplink-cli
//!
//! Command line entry point for droplink. Parses flags (with their agent
//! environment variable fallbacks), sets up logging and error handling, and
//! runs one linking pass over a build's artifacts.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use droplink_core::{LinkError, LinkResult};
use tracing::{error, info};

mod config;
mod output;
mod run;

use output::errors::ErrorFormatter;

/// Link a build's file share artifacts into a local directory
#[derive(Parser)]
#[command(name = "droplink", version, about = "Link build artifacts into a local directory")]
pub struct Cli {
    /// Project the build belongs to
    #[arg(long, env = "SYSTEM_TEAMPROJECT")]
    pub project: String,

    /// Numeric id of the build whose artifacts get linked
    #[arg(long, env = "BUILD_BUILDID")]
    pub build_id: u32,

    /// Collection URL of the build service
    #[arg(long, env = "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI")]
    pub service_url: String,

    /// Directory the links are created in
    #[arg(long, env = "SYSTEM_ARTIFACTSDIRECTORY")]
    pub dest: Utf8PathBuf,

    /// Mirror directories with hard links instead of symlinking them
    #[arg(long)]
    pub hard_links_only: bool,

    /// Empty the destination directory before linking
    #[arg(long)]
    pub clean: bool,

    /// Only link artifacts whose name matches this pattern (case-insensitive)
    #[arg(long, value_name = "REGEX")]
    pub artifact_filter: Option<String>,

    /// Personal access token for the build service
    #[arg(long, env = "SYSTEM_VSTSPAT", hide_env_values = true)]
    pub pat: Option<String>,

    /// OAuth access token, used when no PAT is configured
    #[arg(long, env = "SYSTEM_ACCESSTOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting droplink v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> LinkResult<()> {
    let config = config::RunConfig::from_cli(cli)?;

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| LinkError::io("failed to create async runtime", e))?;

    rt.block_on(run::execute(config))
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "droplink_cli={level},droplink_core={level},droplink_resolver={level},\
             droplink_api={level},droplink_linker={level}"
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("droplink encountered an unexpected error: {}", panic_info);
        eprintln!("droplink crashed! This is a bug.");
        eprintln!("Please report it at: https://github.com/droplink-build/droplink/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
