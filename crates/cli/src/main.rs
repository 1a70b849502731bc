// ABOUTME: CLI for the imdb-scraper extraction engine.
// ABOUTME: Scrapes a title, runs a search or parses a saved page, printing JSON records.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imdb_scraper::{Client, Record};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Scrape IMDb titles, episodes and search results as JSON.
#[derive(Parser, Debug)]
#[command(name = "imdb-scraper")]
#[command(about = "Scrape IMDb titles and search results and print JSON", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Page language, e.g. en, it, pt-BR.
    #[arg(long, global = true, default_value = "en")]
    locale: String,

    /// Fetch every season of a series.
    #[arg(long, global = true, default_value_t = false)]
    seasons: bool,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Origin of title pages.
    #[arg(long, global = true, hide = true)]
    base_url: Option<String>,

    /// Search suggestion endpoint.
    #[arg(long, global = true, hide = true)]
    suggestion_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one title by id (tt0816692) or by keyword (first search hit).
    Title { id_or_keyword: String },
    /// List search suggestions for a keyword.
    Search { keyword: String },
    /// Extract a title from a saved title page.
    Parse {
        /// Saved HTML file.
        #[arg(long)]
        html: PathBuf,
        /// Identifier of the saved title.
        #[arg(long)]
        id: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "imdb_scraper=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(args: &Args) -> Result<Client> {
    let mut builder = Client::builder()
        .locale(args.locale.clone())
        .seasons(args.seasons);
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(suggestion_url) = &args.suggestion_url {
        builder = builder.suggestion_url(suggestion_url.clone());
    }
    builder.build().context("invalid client configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let client = build_client(&args)?;
    debug!(command = ?args.command, locale = %args.locale, "running");

    let output: Value = match &args.command {
        Command::Title { id_or_keyword } => {
            let title = client
                .film(id_or_keyword)
                .await
                .with_context(|| format!("failed to scrape {}", id_or_keyword))?;
            Value::Object(title.to_array())
        }
        Command::Search { keyword } => client
            .search(keyword)
            .await
            .with_context(|| format!("search for {:?} failed", keyword))?
            .to_array(),
        Command::Parse { html, id } => {
            let source = fs::read_to_string(html)
                .with_context(|| format!("failed to read {}", html.display()))?;
            Value::Object(client.parse_html(id, &source)?.to_array())
        }
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
