mod clone;
mod config;
mod error;
mod github;
mod mrconfig;
#[cfg(test)]
mod test_utils;

use clap::Parser;
use clone::orchestrator::{Orchestrator, OrchestratorConfig};
use clone::runner::ProcessRunner;
use config::{Config, Overrides};
use error::Result;
use github::client::GitHubClient;
use github::lister::{ListerConfig, RepositoryLister};
use github::types::{RepoRef, Selection};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "forkfetch",
    about = "Clone all forks of a GitHub repository, or all GitHub Classroom repos of an assignment"
)]
struct Cli {
    #[arg(help = "GitHub owner/repo (or organization/assignment with --classroom)")]
    repo: String,

    #[arg(help = "The name of the directory to clone into [default: .]")]
    directory: Option<PathBuf>,

    #[arg(long, help = "Print the clone commands instead of running them")]
    dry_run: bool,

    #[arg(long, short, help = "The number of repos fetched at the same time [default: 8]")]
    jobs: Option<usize>,

    #[arg(long, help = "Repo is a GitHub Classroom assignment prefix")]
    classroom: bool,

    #[arg(long, help = "Do not write a .mrconfig into the directory")]
    no_mrconfig: bool,

    #[arg(long, short, help = "Log progress to stderr")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "forkfetch=debug" } else { "forkfetch=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(Overrides {
        jobs: cli.jobs,
        dry_run: cli.dry_run,
        classroom: cli.classroom,
        base_dir: cli.directory,
        no_mrconfig: cli.no_mrconfig,
    })?;
    tracing::debug!(?config, "configuration loaded");

    let token = config.require_token()?;
    let repo = RepoRef::parse(&cli.repo)?;
    let selection = Selection::new(&repo.name, config.classroom);

    let client = GitHubClient::new(token)?;
    let lister = RepositoryLister::new(
        client,
        ListerConfig {
            page_size: config.effective_page_size(),
        },
    );
    let repos = lister.list(&repo.owner, &selection).await?;
    if repos.is_empty() {
        tracing::warn!(owner = %repo.owner, name = %repo.name, "no repositories matched");
    }

    let tasks = clone::task::plan(&repos, &selection);
    let entries = mrconfig::entries(&tasks);

    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            jobs: config.effective_jobs(),
            dry_run: config.dry_run,
            base_dir: config.base_dir.clone(),
        },
        ProcessRunner,
    );
    let result = orchestrator.run(tasks).await?;

    if config.write_mrconfig {
        mrconfig::write(&config.base_dir, &entries, config.dry_run)?;
    }

    result.into_result().map(|_| ())
}
