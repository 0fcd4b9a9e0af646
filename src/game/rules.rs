use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid rules: {0}")]
    Invalid(String),
    #[error("Too many possible decks of {deck_size} cards from a catalog of {cards}")]
    DeckSpaceTooLarge { cards: usize, deck_size: usize },
}

/// Match and deck-building parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Cards in a randomly generated deck
    pub deck_size: usize,
    /// Maximum number of rounds in a match
    pub rounds: u32,
    /// Cards drawn each round (at most one is played)
    pub draws_per_round: usize,
    /// Point lead that ends the match immediately unless the trailing side has a save
    pub instant_win_threshold: i64,
    /// Redraws only happen while the playable cost ceiling is below this
    pub redraw_cost_ceiling: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            deck_size: 12,
            rounds: 6,
            draws_per_round: 2,
            instant_win_threshold: 2000,
            redraw_cost_ceiling: 5,
        }
    }
}

impl Rules {
    /// Load rules from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &str) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path)?;
        let rules: Rules = serde_json::from_str(&content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.deck_size == 0 {
            return Err(RulesError::Invalid("deck_size must be positive".to_string()));
        }
        if self.rounds == 0 {
            return Err(RulesError::Invalid("rounds must be positive".to_string()));
        }
        if self.draws_per_round == 0 {
            return Err(RulesError::Invalid("draws_per_round must be positive".to_string()));
        }
        Ok(())
    }
}
