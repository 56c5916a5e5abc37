mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kunyu_api::{MalScraper, ScrapeError};
use kunyu_core::config::AppConfig;
use kunyu_core::KunyuError;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "kunyu_core=info,kunyu_parse=info,kunyu_api=info";
const VERBOSE_FILTER: &str = "kunyu_core=debug,kunyu_parse=debug,kunyu_api=debug";

/// Fetch and search anime and character details from MyAnimeList.
#[derive(Debug, Parser)]
#[command(name = "kunyu", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Cache fetched records in a local database.
    #[arg(long, global = true)]
    cache: bool,

    /// Cache database path (implies --cache).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Get anime details by ID.
    GetAnime {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search for an anime by name.
    SearchAnime {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Get character details by ID.
    GetCharacter {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search for a character by name.
    SearchCharacter {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] KunyuError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("could not serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig, KunyuError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if cli.cache {
        config.cache.enabled = true;
    }
    if let Some(db) = &cli.db {
        config.cache.enabled = true;
        config.cache.db_path = Some(db.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    tracing::debug!(cache = config.cache.enabled, base_url = %config.scraper.base_url, "Loaded config");
    let scraper = MalScraper::open(&config)?;

    match &cli.command {
        Command::GetAnime { ids } => {
            let records = match ids.as_slice() {
                [id] => vec![scraper.get_anime(id).await?],
                ids => scraper.get_anime_batch(ids).await?,
            };
            emit(&records, cli.json, output::anime)
        }
        Command::SearchAnime { names } => {
            let records = match names.as_slice() {
                [name] => vec![scraper.search_anime(name).await?],
                names => scraper.search_anime_batch(names).await?,
            };
            emit(&records, cli.json, output::anime)
        }
        Command::GetCharacter { ids } => {
            let records = match ids.as_slice() {
                [id] => vec![scraper.get_character(id).await?],
                ids => scraper.get_character_batch(ids).await?,
            };
            emit(&records, cli.json, output::character)
        }
        Command::SearchCharacter { names } => {
            let records = match names.as_slice() {
                [name] => vec![scraper.search_character(name).await?],
                names => scraper.search_character_batch(names).await?,
            };
            emit(&records, cli.json, output::character)
        }
    }
}

fn emit<T: Serialize>(records: &[T], json: bool, render: fn(&T) -> String) -> Result<(), CliError> {
    if json {
        let text = match records {
            [record] => serde_json::to_string_pretty(record)?,
            records => serde_json::to_string_pretty(records)?,
        };
        println!("{text}");
    } else {
        let blocks: Vec<String> = records.iter().map(render).collect();
        println!("{}", blocks.join("\n"));
    }
    Ok(())
}
