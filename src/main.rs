//! gitree: prints the git repositories below a directory as a tree with inline status
//!
//! Each repository line shows its branch, ahead/behind counts against `origin`, and
//! markers for stashes and uncommitted changes.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use gitree::commands::{handle_tree_command, TreeArgs};
use gitree::core::DEFAULT_EXTRACT_TIMEOUT;
use gitree::utils::ColorChoice;

#[derive(Parser, Debug)]
#[command(name = "gitree", version, about = "Show git repositories as a tree with their status")]
struct Cli {
    /// Directory to scan (defaults to the current directory)
    path: Option<PathBuf>,

    /// Number of repositories to read concurrently
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Per-repository status timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_EXTRACT_TIMEOUT.as_secs())]
    timeout: u64,

    /// When to color the output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Print the scan result as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Log timing, status summaries and changed files
    #[arg(long)]
    debug: bool,

    /// Hide the progress spinner
    #[arg(long)]
    no_progress: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let args = TreeArgs {
        path: cli.path,
        jobs: cli.jobs,
        timeout: Duration::from_secs(cli.timeout),
        color: cli.color,
        json: cli.json,
        debug: cli.debug,
        no_progress: cli.no_progress,
    };

    match handle_tree_command(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
