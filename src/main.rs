mod commands;
mod config;
mod github;
mod llm;
mod pr;
mod publish;
mod report;
mod review;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Review Bot — reviews the open Pull Requests of one GitHub repository
/// with an LLM and posts the verdict back as a PR review.
#[derive(Parser, Debug)]
#[command(name = "pr-review-bot", version, about)]
struct Cli {
    /// TOML config file (default: .pr-review-bot.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the reviews instead of publishing them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review every open pull request of the configured repository
    #[command(name = "review_all_open_pr", alias = "review-all-open-pr")]
    ReviewAllOpenPr,

    /// Review a single pull request
    #[command(name = "review_pr", alias = "review-pr")]
    ReviewPr {
        /// Pull request number
        pr_number: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pr_number = match cli.command {
        Command::ReviewAllOpenPr => None,
        Command::ReviewPr { pr_number: None } => {
            report::print_usage_hint();
            return Ok(());
        }
        Command::ReviewPr {
            pr_number: Some(number),
        } => Some(number),
    };

    info!("loading configuration");
    let settings = config::Settings::load(cli.config.as_deref())?;
    debug!(?settings, "resolved settings");

    let host = github::GitHubClient::new(&settings)?;
    let model = llm::OpenAiClient::new(&settings)?;
    let _main_span = info_span!(
        "pr_review_bot",
        owner = %settings.owner,
        repo = %settings.repo_name,
        model = %model.model()
    )
    .entered();

    match pr_number {
        None => {
            let outcomes =
                commands::review_all_open_prs(&host, &model, &settings, cli.dry_run).await?;
            info!(reviewed = outcomes.len(), "done");
        }
        Some(number) => {
            let verdict =
                commands::review_pr(&host, &model, &settings, number, cli.dry_run).await?;
            info!(%verdict, "done");
        }
    }

    Ok(())
}
