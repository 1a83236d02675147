//! Player Seeker - guess-the-footballer on the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use player_seeker::{
    ConfigOverrides, GameConfig, GameSession, InMemoryCatalog, PlayerCatalog, SeededRandom,
    build_hints, console,
};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let catalog = open_catalog(&cli, &config)?;

    match cli.command {
        Command::Play => run_play(config, catalog).await,
        Command::Search { query } => run_search(catalog, query).await,
        Command::Show { id } => run_show(config, catalog, id).await,
    }
}

/// Merges config file, environment and CLI flags, in rising priority.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let overrides = ConfigOverrides {
        api_url: cli.api_url.clone(),
        record_style: cli.record_style,
        locale: cli.locale,
        fetch_failure: cli.fetch_failure,
        seed: cli.seed,
    };
    Ok(GameConfig::load(cli.config.as_deref(), &overrides)?)
}

/// Opens the offline file if given, the remote catalog otherwise.
#[instrument(skip(cli, config))]
fn open_catalog(cli: &Cli, config: &GameConfig) -> Result<Arc<dyn PlayerCatalog>> {
    if let Some(path) = &cli.offline {
        info!(path = %path.display(), "Using offline catalog");
        let catalog = InMemoryCatalog::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok(Arc::new(catalog));
    }

    info!(api_url = %config.catalog().api_url(), "Using remote catalog");
    Ok(Arc::new(config.catalog().connect()?))
}

/// Plays on stdin/stdout until the user quits or the pool runs out.
async fn run_play(config: GameConfig, catalog: Arc<dyn PlayerCatalog>) -> Result<()> {
    let mut session = GameSession::new(catalog, config.session_options());
    if let Some(seed) = *config.seed() {
        session = session.with_rng(SeededRandom::new(seed));
    }

    session.start().await.context("starting game")?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    console::run(&mut session, stdin, &mut stdout).await?;

    info!(score = session.score(), "Game over");
    Ok(())
}

/// Prints catalog players matching `query`.
async fn run_search(catalog: Arc<dyn PlayerCatalog>, query: String) -> Result<()> {
    let options = catalog.list_players().await?;
    let mut stdout = std::io::stdout().lock();
    for option in player_seeker::filter(&query, &options) {
        writeln!(stdout, "{}\t{}", option.player_id, option.name)?;
    }
    Ok(())
}

/// Prints one record's hints in generation order.
async fn run_show(
    config: GameConfig,
    catalog: Arc<dyn PlayerCatalog>,
    id: player_seeker::PlayerId,
) -> Result<()> {
    let record = catalog.fetch_player(id).await?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{} (#{})", record.name(), record.player_id())?;
    for hint in build_hints(&record, *config.locale()) {
        writeln!(stdout, "  - {}", hint)?;
    }
    Ok(())
}
