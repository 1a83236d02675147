//! Player data as served by the remote catalog.

use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Externally assigned, stable player identifier.
pub type PlayerId = i64;

/// Lightweight handle used for selection and search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct PlayerOption {
    /// Catalog id.
    pub player_id: PlayerId,
    /// Display name.
    pub name: String,
}

impl std::fmt::Display for PlayerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.player_id)
    }
}

/// One season spent at one club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct CareerEntry {
    /// Season label, e.g. `2019/20` or `2015-2018`.
    pub season: String,
    /// Club name.
    pub club: String,
}

/// A single transfer between clubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Selling club.
    pub from: String,
    /// Buying club.
    pub to: String,
    /// Transfer date as published by the source.
    pub date: String,
    /// Fee as published by the source (free text, e.g. `€12.5m`).
    pub fee: String,
}

/// Transfers keyed by season.
pub type TransferHistory = BTreeMap<String, Vec<Transfer>>;

/// Full player detail record.
///
/// Fetched lazily once a player becomes the target and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct PlayerRecord {
    /// Catalog id.
    #[setters(skip)]
    player_id: PlayerId,
    /// Display name.
    #[setters(skip)]
    name: String,
    /// Birth date as published by the source.
    #[serde(default)]
    birth_date: String,
    /// Birth place.
    #[serde(default)]
    birth_place: String,
    /// Playing position.
    #[serde(default)]
    position: String,
    /// Age. Some sources send a number, others a string.
    #[serde(default, deserialize_with = "string_or_number")]
    age: String,
    /// Current club.
    #[serde(default)]
    current_club: String,
    /// Every club the player appeared for, possibly with repeats.
    #[serde(default)]
    #[setters(skip)]
    clubs_played: Vec<String>,
    /// Career in chronological order.
    #[serde(default)]
    #[setters(skip)]
    career_timeline: Vec<CareerEntry>,
    /// Transfers keyed by season.
    #[serde(default)]
    #[setters(skip)]
    transfer_history: TransferHistory,
}

impl PlayerRecord {
    /// Creates a record with the given id and name; every other field is
    /// empty. Used for fixtures and offline catalogs.
    #[instrument(skip(name))]
    pub fn new(player_id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            player_id,
            name: name.into(),
            birth_date: String::new(),
            birth_place: String::new(),
            position: String::new(),
            age: String::new(),
            current_club: String::new(),
            clubs_played: Vec::new(),
            career_timeline: Vec::new(),
            transfer_history: TransferHistory::new(),
        }
    }

    /// Appends a club to `clubs_played`.
    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.clubs_played.push(club.into());
        self
    }

    /// Appends a career timeline entry.
    pub fn with_season(mut self, season: impl Into<String>, club: impl Into<String>) -> Self {
        self.career_timeline
            .push(CareerEntry::new(season.into(), club.into()));
        self
    }

    /// Appends a transfer under the given season.
    pub fn with_transfer(mut self, season: impl Into<String>, transfer: Transfer) -> Self {
        self.transfer_history
            .entry(season.into())
            .or_default()
            .push(transfer);
        self
    }

    /// Returns the selection handle for this record.
    pub fn option(&self) -> PlayerOption {
        PlayerOption::new(self.player_id, self.name.clone())
    }

    /// Number of distinct clubs in `clubs_played`.
    pub fn distinct_club_count(&self) -> usize {
        let mut clubs: Vec<&str> = self.clubs_played.iter().map(String::as_str).collect();
        clubs.sort_unstable();
        clubs.dedup();
        clubs.len()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null(()) => String::new(),
    })
}
