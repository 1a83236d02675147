//! Fixed score deltas for game events.

use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Something that moves the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ScoreEvent {
    /// A new target was selected.
    TargetSelected,
    /// A hint was revealed.
    HintRevealed,
    /// A guess named the wrong player.
    WrongGuess,
    /// The player gave up and the answer was shown.
    AnswerRevealed,
}

/// Score deltas, all expressed as positive magnitudes.
///
/// Defaults: +100 per target, −5 per hint, −1 per wrong guess, −120 per
/// revealed answer, starting from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ScoreRules {
    /// Score before any event.
    initial_score: i64,
    /// Added when a target is selected.
    target_reward: i64,
    /// Subtracted per revealed hint.
    hint_penalty: i64,
    /// Subtracted per incorrect guess.
    wrong_guess_penalty: i64,
    /// Subtracted when the answer is revealed.
    reveal_penalty: i64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            initial_score: 0,
            target_reward: 100,
            hint_penalty: 5,
            wrong_guess_penalty: 1,
            reveal_penalty: 120,
        }
    }
}

impl ScoreRules {
    /// Name of the first reward or penalty below zero, if any.
    pub fn negative_field(&self) -> Option<&'static str> {
        [
            ("target_reward", self.target_reward),
            ("hint_penalty", self.hint_penalty),
            ("wrong_guess_penalty", self.wrong_guess_penalty),
            ("reveal_penalty", self.reveal_penalty),
        ]
        .into_iter()
        .find(|(_, value)| *value < 0)
        .map(|(name, _)| name)
    }

    /// Signed delta applied for `event`.
    pub fn delta(&self, event: ScoreEvent) -> i64 {
        match event {
            ScoreEvent::TargetSelected => self.target_reward,
            ScoreEvent::HintRevealed => self.hint_penalty.saturating_neg(),
            ScoreEvent::WrongGuess => self.wrong_guess_penalty.saturating_neg(),
            ScoreEvent::AnswerRevealed => self.reveal_penalty.saturating_neg(),
        }
    }
}
