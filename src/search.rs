//! Autocomplete over player names, insensitive to case and diacritics.

use crate::player::PlayerOption;
use std::ops::RangeInclusive;
use tracing::{debug, instrument};
use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block.
const COMBINING_MARKS: RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Folds `text` for matching: canonical decomposition, combining marks
/// dropped, lowercased.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Returns every option whose folded name contains the folded query, in
/// input order. An empty query returns `options` unchanged.
#[instrument(skip(options), fields(candidates = options.len()))]
pub fn filter(query: &str, options: &[PlayerOption]) -> Vec<PlayerOption> {
    if query.is_empty() {
        return options.to_vec();
    }

    let needle = normalize(query);
    let matches: Vec<PlayerOption> = options
        .iter()
        .filter(|option| normalize(&option.name).contains(&needle))
        .cloned()
        .collect();

    debug!(matches = matches.len(), "Filtered options");
    matches
}

/// Option list with pre-folded names, for repeated queries over the same
/// catalog.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<(String, PlayerOption)>,
}

impl SearchIndex {
    /// Indexes `options`, keeping their order.
    #[instrument(skip(options), fields(count = options.len()))]
    pub fn new(options: Vec<PlayerOption>) -> Self {
        let entries = options
            .into_iter()
            .map(|option| (normalize(&option.name), option))
            .collect();
        Self { entries }
    }

    /// Same semantics as [`filter`] over the indexed options.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Vec<PlayerOption> {
        if query.is_empty() {
            return self.options();
        }

        let needle = normalize(query);
        self.entries
            .iter()
            .filter(|(folded, _)| folded.contains(&needle))
            .map(|(_, option)| option.clone())
            .collect()
    }

    /// Looks up an option by id.
    pub fn get(&self, player_id: crate::PlayerId) -> Option<&PlayerOption> {
        self.entries
            .iter()
            .map(|(_, option)| option)
            .find(|option| option.player_id == player_id)
    }

    /// Indexed options in their original order.
    pub fn options(&self) -> Vec<PlayerOption> {
        self.entries.iter().map(|(_, option)| option.clone()).collect()
    }

    /// Number of indexed options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
