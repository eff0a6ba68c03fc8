// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the addon scraper.
//!
//! `scrape` runs the full batch and writes both databases, `check` runs the
//! pipeline for one repository and `search` lists the filtered candidates
//! without fetching anything else.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc,
};

use addon_scraper::{
    Aggregator, Error, GitHubHost, Outcome, PacedHost, Pacer, Pipeline, RunSettings, Scraper,
    ScraperConfig, cancellation, parse_repository_id,
};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command line interface for scraping Meteor addons.
#[derive(Debug, Parser,)]
#[command(name = "addon-scraper", version, about = "Discover and validate Meteor client addons")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Search, validate every candidate and write both databases.
    Scrape(ScrapeArgs,),
    /// Run the pipeline for a single `owner/name` repository.
    Check(CheckArgs,),
    /// Print the candidate ids that survive the blacklist.
    Search(CommonArgs,),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Default,)]
struct CommonArgs
{
    /// YAML configuration file; defaults apply when omitted.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// GitHub API token; overrides the configured token file.
    #[arg(long = "token", value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,
}

#[derive(Debug, Args,)]
struct ScrapeArgs
{
    #[command(flatten)]
    common: CommonArgs,

    /// Directory receiving `database.json` and `error_database.json`.
    #[arg(long = "output", value_name = "DIR")]
    output: Option<PathBuf,>,

    /// Number of repositories processed at the same time.
    #[arg(long = "concurrency", value_name = "N")]
    concurrency: Option<usize,>,

    /// Disable the progress bar.
    #[arg(long = "no-progress", action = ArgAction::SetTrue)]
    no_progress: bool,
}

#[derive(Debug, Args,)]
struct CheckArgs
{
    /// Repository to check, as `owner/name`.
    #[arg(value_name = "OWNER/NAME")]
    repository: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let layer = fmt::layer().with_target(false,).with_writer(io::stderr,).compact();
    // A subscriber installed earlier (e.g. by a test harness) wins.
    let _ = tracing_subscriber::registry().with(filter,).with(layer,).try_init();
}

async fn run(cli: Cli,) -> Result<(), Error,>
{
    match cli.command {
        Command::Scrape(args,) => run_scrape(args,).await,
        Command::Check(args,) => run_check(args,).await,
        Command::Search(args,) => run_search(args,).await,
    }
}

fn load_config(common: &CommonArgs,) -> Result<ScraperConfig, Error,>
{
    ScraperConfig::load(common.config.as_deref(),)
}

fn build_scraper(
    config: &ScraperConfig,
    common: &CommonArgs,
    progress: bool,
) -> Result<Scraper<PacedHost<GitHubHost,>,>, Error,>
{
    let token = config.load_token(common.token.as_deref(),);
    let github = GitHubHost::new(&config.github_settings(token,),)?;
    let host = PacedHost::new(github, Arc::new(Pacer::new(config.request_delay(),),),);

    let pipeline = Pipeline::new(
        host,
        Arc::new(config.load_blacklist(),),
        config.version_gate(),
        config.pipeline_settings(),
    );
    let settings = RunSettings {
        query: config.search_query(Utc::now(),),
        per_page: config.per_page,
        max_pages: config.max_pages,
        concurrency: config.concurrency,
        progress,
    };
    Ok(Scraper::new(pipeline, settings,),)
}

async fn run_scrape(args: ScrapeArgs,) -> Result<(), Error,>
{
    let mut config = load_config(&args.common,)?;
    if let Some(concurrency,) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;
    let output_dir = args.output.unwrap_or_else(|| config.output_path(),);

    let scraper = build_scraper(&config, &args.common, !args.no_progress,)?;
    let (handle, token,) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight repositories");
            handle.cancel();
        }
    },);

    let aggregator = Aggregator::new();
    let report = scraper.run(&token, &aggregator,).await?;
    let written = aggregator.write_to(&output_dir,)?;

    info!(
        "Finished: {} accepted, {} rejected; wrote {} and {}",
        report.accepted,
        report.rejected,
        written.addons.display(),
        written.errors.display()
    );
    Ok((),)
}

async fn run_check(args: CheckArgs,) -> Result<(), Error,>
{
    let (owner, name,) = parse_repository_id(&args.repository,)?;
    let config = load_config(&args.common,)?;
    let scraper = build_scraper(&config, &args.common, false,)?;

    let outcome = scraper.check(owner, name,).await?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_outcome(&mut handle, &outcome,)
}

fn write_outcome<W: Write,>(writer: &mut W, outcome: &Outcome,) -> Result<(), Error,>
{
    match outcome {
        Outcome::Accepted(record,) => serde_json::to_writer_pretty(&mut *writer, record,)?,
        Outcome::Rejected(record,) => serde_json::to_writer_pretty(&mut *writer, record,)?,
        Outcome::Cancelled {
            id,
        } => return Err(Error::service(format!("check of {id} was cancelled"),),),
    }
    writeln!(writer).map_err(|e| Error::service(format!("failed to write output: {e}"),),)
}

async fn run_search(args: CommonArgs,) -> Result<(), Error,>
{
    let config = load_config(&args,)?;
    let scraper = build_scraper(&config, &args, false,)?;
    let candidates = scraper.candidates().await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_ids(&mut handle, candidates.iter().map(|repo| repo.candidate_id(),),)
}

fn write_ids<W, I,>(writer: &mut W, ids: I,) -> Result<(), Error,>
where
    W: Write,
    I: IntoIterator<Item = String,>,
{
    for id in ids {
        writeln!(writer, "{id}").map_err(|e| Error::service(format!("failed to write output: {e}"),),)?;
    }
    Ok((),)
}
