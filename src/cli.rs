//! Command-line interface for player_seeker.

use clap::{Parser, Subcommand};
use player_seeker::{FetchFailurePolicy, HintLocale, PlayerId, RecordStyle};

/// Player Seeker - guess the footballer from progressive hints
#[derive(Parser, Debug)]
#[command(name = "player_seeker")]
#[command(about = "Guess-the-footballer trivia game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Catalog base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Record endpoint style
    #[arg(long, global = true)]
    pub record_style: Option<RecordStyle>,

    /// Serve players from a local JSON file instead of the remote catalog
    #[arg(long, global = true)]
    pub offline: Option<std::path::PathBuf>,

    /// Hint language (en or tr)
    #[arg(long, global = true)]
    pub locale: Option<HintLocale>,

    /// Candidate handling when a fetch fails (consume or restore)
    #[arg(long, global = true)]
    pub fetch_failure: Option<FetchFailurePolicy>,

    /// Seed for reproducible target and hint order
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively on the terminal
    Play,

    /// List catalog players matching a query
    Search {
        /// Text to match, ignoring case and accents
        #[arg(default_value = "")]
        query: String,
    },

    /// Fetch one player and print its hints in order
    Show {
        /// Catalog id
        id: PlayerId,
    },
}
