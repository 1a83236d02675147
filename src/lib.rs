//! Player Seeker library - guess-the-footballer game core
//!
//! A random target player is drawn from a remote catalog; the user buys
//! hints, searches names and submits guesses while a score tracks the
//! cost of each step.
//!
//! # Architecture
//!
//! - **Catalog**: read access to the player store (HTTP or in-memory)
//! - **Search**: case- and accent-insensitive autocomplete
//! - **Hints**: fact strings derived from a player record
//! - **Session**: the game state machine and score
//! - **Console**: a line-based front-end over a session
//!
//! # Example
//!
//! ```no_run
//! use player_seeker::{GameSession, InMemoryCatalog, PlayerRecord, SessionOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), player_seeker::SessionError> {
//! let catalog = InMemoryCatalog::new(vec![
//!     PlayerRecord::new(1, "Gheorghe Hagi").with_current_club("Retired"),
//! ]);
//! let mut session = GameSession::new(Arc::new(catalog), SessionOptions::default());
//! let target = session.start().await?;
//! let hint = session.reveal_hint()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod config;
mod hints;
mod player;
mod random;
mod scoring;
mod search;
mod session;

// Public front-end
pub mod console;

// Crate-level exports - Catalog
pub use catalog::{
    CatalogError, CatalogErrorKind, HttpCatalog, InMemoryCatalog, PlayerCatalog, RecordStyle,
};

// Crate-level exports - Configuration
pub use config::{API_URL_ENV, CatalogConfig, ConfigError, ConfigOverrides, GameConfig};

// Crate-level exports - Hints
pub use hints::{HintLocale, build_hints};

// Crate-level exports - Player data
pub use player::{CareerEntry, PlayerId, PlayerOption, PlayerRecord, Transfer, TransferHistory};

// Crate-level exports - Randomness
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};

// Crate-level exports - Scoring
pub use scoring::{ScoreEvent, ScoreRules};

// Crate-level exports - Search
pub use search::{SearchIndex, filter, normalize};

// Crate-level exports - Session
pub use session::{
    Advance, AnswerReveal, FetchFailurePolicy, GameSession, GuessOutcome, SessionError,
    SessionOptions, SessionState,
};
