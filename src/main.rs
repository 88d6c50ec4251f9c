use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use viable_commit::config::AppConfig;
use viable_commit::finder::ViableCommitFinder;
use viable_commit::policy::GreenPolicy;
use viable_commit::source::fixture::{FixtureCheckSource, FixtureCommitRange};
use viable_commit::source::git::GitCommitRange;
use viable_commit::source::rockset::RocksetCheckSource;
use viable_commit::source::{CheckResultSource, CommitRangeSource};

#[derive(Parser)]
#[command(
    name = "viable-commit",
    about = "Print the latest mainline commit whose required CI workflows all passed"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Repository to list commits from (overrides git.repo_path)
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Print every candidate commit with its check conclusions to stderr
    #[arg(long)]
    status: bool,

    /// Read candidate commits from a newline-separated file instead of git
    #[arg(long)]
    commits_file: Option<PathBuf>,

    /// Read check results from a JSON file instead of the query service
    #[arg(long)]
    results_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

// Logs go to stderr; stdout carries only the result
fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(repo) = cli.repo {
        config.git.repo_path = repo;
    }

    tracing::debug!(?config, "Loaded configuration");

    let commits: Box<dyn CommitRangeSource> = match &cli.commits_file {
        Some(path) => Box::new(FixtureCommitRange::from_file(path).await?),
        None => Box::new(GitCommitRange::new(&config.git)),
    };

    let checks: Box<dyn CheckResultSource> = match &cli.results_file {
        Some(path) => Box::new(FixtureCheckSource::from_file(path).await?),
        None => Box::new(RocksetCheckSource::from_config(&config.rockset)?),
    };

    let policy = GreenPolicy::new(&config.policy)?;
    let outcome = ViableCommitFinder::new(commits, checks, policy).run().await?;

    if cli.status {
        eprint!("{}", outcome.status_report());
    }

    match outcome.latest_green {
        Some(commit) => println!("{commit}"),
        None => println!("None"),
    }

    Ok(())
}
