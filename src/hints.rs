//! Hint generation from a player record.
//!
//! Generation order is fixed: one hint per career season, then current
//! club, birth place, birth date, position, age and distinct club count.
//! The session decides reveal order.

use crate::player::{CareerEntry, PlayerRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Language hints are phrased in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HintLocale {
    /// English.
    #[default]
    En,
    /// Turkish.
    Tr,
}

/// Builds the full hint list for `record` in generation order.
#[instrument(skip(record, locale), fields(player_id = *record.player_id(), locale = %locale))]
pub fn build_hints(record: &PlayerRecord, locale: HintLocale) -> Vec<String> {
    let mut hints: Vec<String> = record
        .career_timeline()
        .iter()
        .map(|entry| career_hint(entry, locale))
        .collect();

    let clubs = record.distinct_club_count();
    let facts = match locale {
        HintLocale::En => [
            format!("Currently plays for {}.", record.current_club()),
            format!("Was born in {}.", record.birth_place()),
            format!("Was born on {}.", record.birth_date()),
            format!("Plays as {}.", record.position()),
            format!("Is {} years old.", record.age()),
            format!("Has played for {} different clubs.", clubs),
        ],
        HintLocale::Tr => [
            format!("Şu an {}'te oynamaktadır.", record.current_club()),
            format!("Doğum yeri {}'dir.", record.birth_place()),
            format!("Doğum tarihi {}'dir.", record.birth_date()),
            format!("Pozisyonu {}'dir.", record.position()),
            format!("Yaşı {}'dir.", record.age()),
            format!("Toplamda {} farklı kulüpte oynamıştır.", clubs),
        ],
    };
    hints.extend(facts);

    debug!(count = hints.len(), "Built hints");
    hints
}

fn career_hint(entry: &CareerEntry, locale: HintLocale) -> String {
    match locale {
        HintLocale::En => format!("Played for {} during season {}.", entry.club, entry.season),
        HintLocale::Tr => format!(
            "{} sezon/sezonlarinda {}'te oynamıştır.",
            entry.season, entry.club
        ),
    }
}
