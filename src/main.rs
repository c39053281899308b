//! bookwatch - book catalogue scraper
//!
//! Collects titles, prices, availability and ratings, converts prices and
//! keeps a running spreadsheet of what was seen.

use anyhow::Result;
use bookwatch::catalogue::{Currency, MalformedPolicy};
use bookwatch::commands::{ListCommand, RateCommand, RunCommand};
use bookwatch::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bookwatch",
    version,
    about = "Book catalogue scraper with currency conversion and email summaries"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Spreadsheet file to append to
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Maximum number of catalogue pages to fetch
    #[arg(long, global = true)]
    max_pages: Option<u32>,

    /// Output format for `list`
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Currency catalogue prices are read as
    #[arg(long, global = true)]
    from: Option<Currency>,

    /// Currency prices are converted to
    #[arg(long, global = true)]
    to: Option<Currency>,

    /// Do not send the summary email
    #[arg(long, global = true)]
    no_email: bool,

    /// Skip malformed listings instead of aborting
    #[arg(long, global = true)]
    skip_malformed: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "BOOKWATCH_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the catalogue, save to the spreadsheet and send the summary
    Run,

    /// Scrape and print the catalogue without saving or mailing
    #[command(alias = "ls")]
    List,

    /// Show the conversion rate a run would use
    Rate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = load_config(&cli);
    let command = cli.command.unwrap_or(Commands::Run);

    match command {
        Commands::Run => match config {
            // Failures are logged by the guard; the process still exits cleanly.
            Ok(config) => {
                RunCommand::new(config).execute_guarded().await;
            }
            Err(e) => error!("Unexpected error: {:#}", e),
        },

        Commands::List => {
            let output = ListCommand::new(config?).execute().await?;
            println!("{}", output);
        }

        Commands::Rate => {
            let output = RateCommand::new(config?).execute().await?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// Loads the config file, then applies environment and CLI overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(from) = cli.from {
        config.source_currency = from;
    }
    if let Some(to) = cli.to {
        config.target_currency = to;
    }
    if let Some(proxy) = &cli.proxy {
        config.proxy = Some(proxy.clone());
    }
    if cli.no_email {
        config.mail.enabled = false;
    }
    if cli.skip_malformed {
        config.malformed = MalformedPolicy::Skip;
    }

    config.validate()?;
    Ok(config)
}
