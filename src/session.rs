//! Game session: target selection, hints, guesses and scoring.
//!
//! A session moves through `Idle -> Ready -> Active -> Exhausted`.
//! Every mutating operation takes `&mut self`, so one session can never
//! run two operations at once; share it behind a mutex if needed.
//!
//! The record fetch inside [`GameSession::select_target`] is the only
//! suspending step. The previous target is cleared and the candidate
//! leaves the pool *before* the fetch starts, so a failed, timed-out or
//! dropped fetch always leaves the session in `Ready` with no half-built
//! target.

use crate::catalog::{CatalogError, CatalogErrorKind, PlayerCatalog};
use crate::hints::{HintLocale, build_hints};
use crate::player::{PlayerId, PlayerOption, PlayerRecord};
use crate::random::{RandomSource, ThreadRandom};
use crate::scoring::{ScoreEvent, ScoreRules};
use crate::search::SearchIndex;
use derive_more::{Display, Error, From};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Lifecycle state of a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    /// No catalog loaded yet.
    Idle,
    /// Catalog loaded, no active target.
    Ready,
    /// A target is active and can be guessed.
    Active,
    /// No candidates left; terminal.
    Exhausted,
}

/// What happens to a candidate whose record fetch fails.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// The candidate stays out of the pool.
    #[default]
    Consume,
    /// The candidate goes back to its pool position. A dropped fetch
    /// future still consumes it.
    Restore,
}

/// Tunables for a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Setters)]
#[setters(prefix = "with_")]
pub struct SessionOptions {
    /// Score deltas.
    pub rules: ScoreRules,
    /// Hint language.
    pub locale: HintLocale,
    /// Upper bound on one record fetch.
    pub fetch_timeout: Duration,
    /// Candidate handling when a fetch fails.
    pub fetch_failure: FetchFailurePolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            rules: ScoreRules::default(),
            locale: HintLocale::default(),
            fetch_timeout: Duration::from_secs(10),
            fetch_failure: FetchFailurePolicy::default(),
        }
    }
}

/// Session operation failure. None of these poison the session.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// The catalog listed no players.
    #[display("Catalog has no players")]
    EmptyCatalog,

    /// Every player has already been a target.
    #[display("No players left to guess")]
    PoolExhausted,

    /// Every hint for the current target is already revealed.
    #[display("No hints left for this player")]
    NoHintsRemaining,

    /// The operation is not allowed in the current state.
    #[display("Cannot {} while session is {}", operation, state)]
    InvalidState {
        /// Operation attempted.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    /// The catalog failed to serve a record.
    #[display("Fetching player failed: {}", _0)]
    #[from]
    Fetch(CatalogError),

    /// The record fetch exceeded the configured timeout.
    #[display("Fetching player {} timed out after {:?}", player_id, timeout)]
    Timeout {
        /// Candidate being fetched.
        player_id: PlayerId,
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

impl SessionError {
    /// Whether the session can never select another target.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EmptyCatalog | Self::PoolExhausted)
    }
}

/// Result of moving on to the next target after a correct guess or a
/// revealed answer.
#[derive(Debug, Clone)]
pub enum Advance {
    /// A new target is active.
    Selected(PlayerOption),
    /// The pool ran out; the session is finished.
    Exhausted,
    /// Selection failed; the session is `Ready` and
    /// [`GameSession::select_target`] may be retried.
    Failed(SessionError),
}

/// Outcome of [`GameSession::submit_guess`].
#[derive(Debug, Clone)]
pub enum GuessOutcome {
    /// The guess named the target.
    Correct(Advance),
    /// The guess named someone else.
    Incorrect,
}

impl GuessOutcome {
    /// Whether the guess was right.
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct(_))
    }
}

/// Outcome of [`GameSession::reveal_answer`].
#[derive(Debug, Clone)]
pub struct AnswerReveal {
    /// Record of the target that was given up on.
    pub record: PlayerRecord,
    /// What happened next.
    pub next: Advance,
}

#[derive(Debug, Clone)]
struct ActiveTarget {
    record: PlayerRecord,
    hint_queue: Vec<String>,
    revealed: Vec<String>,
}

/// One player's play-through, from catalog load until the pool runs out.
#[derive(Debug)]
pub struct GameSession {
    catalog: Arc<dyn PlayerCatalog>,
    rng: Box<dyn RandomSource>,
    options: SessionOptions,
    state: SessionState,
    index: SearchIndex,
    pool: Vec<PlayerOption>,
    active: Option<ActiveTarget>,
    score: i64,
}

impl GameSession {
    /// Creates an idle session backed by `catalog`, drawing from thread
    /// entropy.
    #[instrument(skip(catalog))]
    pub fn new(catalog: Arc<dyn PlayerCatalog>, options: SessionOptions) -> Self {
        info!("Creating game session");
        Self {
            catalog,
            rng: Box::new(ThreadRandom),
            options,
            state: SessionState::Idle,
            index: SearchIndex::default(),
            pool: Vec::new(),
            active: None,
            score: *options.rules.initial_score(),
        }
    }

    /// Replaces the random source.
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Lists the catalog, loads it and selects the first target.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<PlayerOption, SessionError> {
        let options = self.catalog.list_players().await?;
        self.load_catalog(options)?;
        self.select_target().await
    }

    /// Fills the candidate pool. Only valid while `Idle`.
    ///
    /// Repeated ids keep their first occurrence.
    #[instrument(skip(self, options), fields(count = options.len()))]
    pub fn load_catalog(&mut self, options: Vec<PlayerOption>) -> Result<(), SessionError> {
        self.require(SessionState::Idle, "load catalog")?;

        if options.is_empty() {
            warn!("Catalog is empty");
            return Err(SessionError::EmptyCatalog);
        }

        let mut seen: HashSet<PlayerId> = HashSet::with_capacity(options.len());
        let mut unique: Vec<PlayerOption> = Vec::with_capacity(options.len());
        for option in options {
            if !seen.insert(option.player_id) {
                warn!(player_id = option.player_id, "Dropping duplicate catalog entry");
                continue;
            }
            unique.push(option);
        }

        self.index = SearchIndex::new(unique.clone());
        self.pool = unique;
        self.state = SessionState::Ready;
        info!(candidates = self.pool.len(), "Catalog loaded");
        Ok(())
    }

    /// Picks a random candidate, fetches its record and makes it the
    /// target. Valid from `Ready` or `Active`.
    ///
    /// An empty pool moves the session to `Exhausted`.
    #[instrument(skip(self), fields(state = %self.state, pool = self.pool.len()))]
    pub async fn select_target(&mut self) -> Result<PlayerOption, SessionError> {
        match self.state {
            SessionState::Ready | SessionState::Active => {}
            SessionState::Exhausted => return Err(SessionError::PoolExhausted),
            SessionState::Idle => {
                return Err(SessionError::InvalidState {
                    operation: "select target",
                    state: SessionState::Idle,
                });
            }
        }

        self.active = None;
        if self.pool.is_empty() {
            info!(score = self.score, "Candidate pool exhausted");
            self.state = SessionState::Exhausted;
            return Err(SessionError::PoolExhausted);
        }
        self.state = SessionState::Ready;

        let slot = self.rng.pick(self.pool.len());
        let candidate = self.pool.remove(slot);
        debug!(player_id = candidate.player_id, slot, "Candidate drawn");

        let timeout = self.options.fetch_timeout;
        let fetched = tokio::time::timeout(timeout, self.catalog.fetch_player(candidate.player_id))
            .await
            .map_err(|_| SessionError::Timeout {
                player_id: candidate.player_id,
                timeout,
            })
            .and_then(|result| result.map_err(SessionError::from))
            .and_then(|record| {
                if *record.player_id() == candidate.player_id {
                    Ok(record)
                } else {
                    Err(SessionError::Fetch(CatalogError::new(
                        CatalogErrorKind::Decode,
                        format!(
                            "Requested player {} but catalog returned {}",
                            candidate.player_id,
                            record.player_id()
                        ),
                    )))
                }
            });

        let record = match fetched {
            Ok(record) => record,
            Err(e) => {
                warn!(player_id = candidate.player_id, error = %e, policy = %self.options.fetch_failure, "Target fetch failed");
                if self.options.fetch_failure == FetchFailurePolicy::Restore {
                    self.pool.insert(slot, candidate);
                }
                return Err(e);
            }
        };

        let hint_queue = build_hints(&record, self.options.locale);
        self.active = Some(ActiveTarget {
            record,
            hint_queue,
            revealed: Vec::new(),
        });
        self.apply(ScoreEvent::TargetSelected);
        self.state = SessionState::Active;

        info!(
            player_id = candidate.player_id,
            remaining = self.pool.len(),
            score = self.score,
            "Target selected"
        );
        Ok(candidate)
    }

    /// Reveals one not-yet-shown hint at random.
    #[instrument(skip(self))]
    pub fn reveal_hint(&mut self) -> Result<String, SessionError> {
        self.require(SessionState::Active, "reveal hint")?;
        let Some(target) = self.active.as_mut() else {
            return Err(SessionError::InvalidState {
                operation: "reveal hint",
                state: self.state,
            });
        };

        if target.hint_queue.is_empty() {
            debug!("Hint queue empty");
            return Err(SessionError::NoHintsRemaining);
        }

        let slot = self.rng.pick(target.hint_queue.len());
        let hint = target.hint_queue.remove(slot);
        target.revealed.push(hint.clone());
        self.apply(ScoreEvent::HintRevealed);

        debug!(score = self.score, "Hint revealed");
        Ok(hint)
    }

    /// Checks `candidate` against the target.
    ///
    /// A correct guess advances to the next target; an incorrect one costs
    /// the wrong-guess penalty and keeps the target.
    #[instrument(skip(self), fields(guess = candidate.player_id))]
    pub async fn submit_guess(
        &mut self,
        candidate: &PlayerOption,
    ) -> Result<GuessOutcome, SessionError> {
        let target_id = self.active_id("submit guess")?;

        if candidate.player_id != target_id {
            self.apply(ScoreEvent::WrongGuess);
            info!(score = self.score, "Incorrect guess");
            return Ok(GuessOutcome::Incorrect);
        }

        info!(player_id = target_id, "Correct guess");
        Ok(GuessOutcome::Correct(self.advance().await))
    }

    /// Gives up on the target: returns its record, charges the reveal
    /// penalty and advances.
    #[instrument(skip(self))]
    pub async fn reveal_answer(&mut self) -> Result<AnswerReveal, SessionError> {
        self.active_id("reveal answer")?;
        let record = match self.active.take() {
            Some(target) => target.record,
            None => {
                return Err(SessionError::InvalidState {
                    operation: "reveal answer",
                    state: self.state,
                });
            }
        };

        self.apply(ScoreEvent::AnswerRevealed);
        info!(player_id = *record.player_id(), score = self.score, "Answer revealed");

        let next = self.advance().await;
        Ok(AnswerReveal { record, next })
    }

    /// Searches the full catalog, current target included.
    pub fn search(&self, query: &str) -> Vec<PlayerOption> {
        self.index.search(query)
    }

    /// Looks up a catalog option by id.
    pub fn find_option(&self, player_id: PlayerId) -> Option<&PlayerOption> {
        self.index.get(player_id)
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Options this session runs with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Every loaded catalog option, in catalog order.
    pub fn catalog_options(&self) -> Vec<PlayerOption> {
        self.index.options()
    }

    /// Players not yet used as a target.
    pub fn candidates(&self) -> &[PlayerOption] {
        &self.pool
    }

    /// Number of players not yet used as a target.
    pub fn candidates_remaining(&self) -> usize {
        self.pool.len()
    }

    /// Handle of the active target.
    pub fn target(&self) -> Option<PlayerOption> {
        self.active.as_ref().map(|target| target.record.option())
    }

    /// Record of the active target.
    pub fn target_record(&self) -> Option<&PlayerRecord> {
        self.active.as_ref().map(|target| &target.record)
    }

    /// Hints shown for the active target, in reveal order.
    pub fn revealed_hints(&self) -> &[String] {
        self.active
            .as_ref()
            .map(|target| target.revealed.as_slice())
            .unwrap_or_default()
    }

    /// Hints still hidden for the active target.
    pub fn remaining_hints(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |target| target.hint_queue.len())
    }

    async fn advance(&mut self) -> Advance {
        match self.select_target().await {
            Ok(option) => Advance::Selected(option),
            Err(SessionError::PoolExhausted) => Advance::Exhausted,
            Err(e) => Advance::Failed(e),
        }
    }

    fn apply(&mut self, event: ScoreEvent) {
        let delta = self.options.rules.delta(event);
        self.score = self.score.saturating_add(delta);
        debug!(%event, delta, score = self.score, "Score updated");
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn active_id(&self, operation: &'static str) -> Result<PlayerId, SessionError> {
        self.require(SessionState::Active, operation)?;
        self.active
            .as_ref()
            .map(|target| *target.record.player_id())
            .ok_or(SessionError::InvalidState {
                operation,
                state: self.state,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::random::ScriptedRandom;

    fn session(picks: Vec<usize>) -> GameSession {
        let catalog = InMemoryCatalog::new(vec![
            PlayerRecord::new(1, "A").with_season("2020", "X"),
            PlayerRecord::new(2, "B"),
        ]);
        GameSession::new(Arc::new(catalog), SessionOptions::default())
            .with_rng(ScriptedRandom::new(picks))
    }

    #[tokio::test]
    async fn test_operations_rejected_while_idle() {
        let mut session = session(vec![]);
        assert!(matches!(
            session.select_target().await,
            Err(SessionError::InvalidState { state: SessionState::Idle, .. })
        ));
        assert!(matches!(
            session.reveal_hint(),
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            session.reveal_answer().await,
            Err(SessionError::InvalidState { .. })
        ));
        assert_eq!(session.score(), 0);
    }

    #[tokio::test]
    async fn test_load_twice_rejected() {
        let mut session = session(vec![]);
        session.load_catalog(vec![PlayerOption::new(1, "A".into())]).unwrap();
        assert!(matches!(
            session.load_catalog(vec![PlayerOption::new(2, "B".into())]),
            Err(SessionError::InvalidState { state: SessionState::Ready, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut session = session(vec![]);
        session
            .load_catalog(vec![
                PlayerOption::new(1, "A".into()),
                PlayerOption::new(1, "A again".into()),
                PlayerOption::new(2, "B".into()),
            ])
            .unwrap();
        assert_eq!(session.candidates_remaining(), 2);
        assert_eq!(session.find_option(1).map(|o| o.name.as_str()), Some("A"));
    }

    #[tokio::test]
    async fn test_start_lists_and_selects() {
        let mut session = session(vec![1]);
        let first = session.start().await.unwrap();
        assert_eq!(first.player_id, 2);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.candidates(), [PlayerOption::new(1, "A".into())]);
        assert_eq!(session.remaining_hints(), 6);
    }

    #[test]
    fn test_terminal_errors() {
        assert!(SessionError::PoolExhausted.is_terminal());
        assert!(SessionError::EmptyCatalog.is_terminal());
        assert!(!SessionError::NoHintsRemaining.is_terminal());
    }
}
