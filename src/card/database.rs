use crate::card::types::{Alignment, BoardFilter, Card, CardDef, CardRef, ScoreRule};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Duplicate short code '{0}' in catalog")]
    DuplicateCode(char),
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
    #[error("Catalog has no cards")]
    Empty,
}

/// Immutable card pool, ordered by card name
#[derive(Debug, Clone)]
pub struct CardDatabase {
    cards: Vec<CardRef>,
}

impl CardDatabase {
    /// Load cards from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CardDatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load cards from a JSON string
    pub fn from_json(content: &str) -> Result<Self, CardDatabaseError> {
        let defs: Vec<CardDef> = serde_json::from_str(content)?;
        Self::from_defs(defs)
    }

    /// Build the pool, rejecting empty catalogs and duplicate short codes
    pub fn from_defs(defs: Vec<CardDef>) -> Result<Self, CardDatabaseError> {
        if defs.is_empty() {
            return Err(CardDatabaseError::Empty);
        }

        let mut cards = Vec::with_capacity(defs.len());
        for def in defs {
            let name = def.name.clone();
            let card = Card::from_def(def)
                .ok_or_else(|| CardDatabaseError::InvalidCard(format!("card '{}' has no short code", name)))?;
            cards.push(Arc::new(card));
        }
        cards.sort_by(|a, b| a.name.cmp(&b.name));

        let mut seen = HashSet::new();
        for card in &cards {
            if !seen.insert(card.code) {
                return Err(CardDatabaseError::DuplicateCode(card.code));
            }
        }

        Ok(CardDatabase { cards })
    }

    /// The built-in twelve card catalog
    pub fn reference() -> Self {
        let flat = |points| ScoreRule::Flat { points };
        let defs = vec![
            def("Alessin, Adamant Angel", 5, Alignment::Good, flat(1800)).with_redraw(),
            def(
                "Bold Battalion",
                4,
                Alignment::Good,
                ScoreRule::PerMatching { points: 600, filter: BoardFilter::Alignment(Alignment::Good) },
            ),
            def("Dreadwing, Darkfire Dragon", 5, Alignment::Evil, flat(2500)),
            def(
                "Evil Emperor Eschatonus, Empyreal Envoy of Entropic End",
                6,
                Alignment::Evil,
                flat(4500),
            ),
            def("Gentle Guard", 1, Alignment::Good, flat(700)),
            def("Horrible Hooligan", 2, Alignment::Evil, flat(900)),
            def("Kindly Knight", 2, Alignment::Good, flat(900)),
            def("Lilac Lotus", 1, Alignment::Artifact, flat(200)).with_empower(),
            def("Murderous Minotaur", 4, Alignment::Evil, flat(1700)),
            def("Patchy Pirate", 1, Alignment::Evil, flat(700)),
            def(
                "Sword of Shadows",
                3,
                Alignment::Artifact,
                ScoreRule::IfAny { points: 2000, filter: BoardFilter::Alignment(Alignment::Evil) },
            ),
            def("Virtuous Vigilante", 3, Alignment::Good, flat(1300)),
        ];

        // The reference table is known-good
        Self::from_defs(defs).unwrap_or_else(|e| unreachable!("reference catalog is invalid: {}", e))
    }

    /// All cards in catalog order
    pub fn cards(&self) -> &[CardRef] {
        &self.cards
    }

    /// Get total number of cards
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Get a card by its full name
    pub fn get_card(&self, name: &str) -> Result<CardRef, CardDatabaseError> {
        self.cards
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| CardDatabaseError::CardNotFound(name.to_string()))
    }

    /// Get a card by its short code
    pub fn get_by_code(&self, code: char) -> Option<CardRef> {
        self.cards.iter().find(|c| c.code == code).cloned()
    }

    /// Catalog position of the card with this code
    pub fn index_of(&self, code: char) -> Option<usize> {
        self.cards.iter().position(|c| c.code == code)
    }

    /// Short codes of every card, in catalog order
    pub fn codes(&self) -> Vec<char> {
        self.cards.iter().map(|c| c.code).collect()
    }
}

fn def(name: &str, cost: u32, alignment: Alignment, score: ScoreRule) -> CardDef {
    CardDef {
        name: name.to_string(),
        cost,
        alignment,
        score,
        code: None,
        empowers: false,
        grants_save: false,
        triggers_redraw: false,
    }
}

impl CardDef {
    fn with_empower(mut self) -> Self {
        self.empowers = true;
        self
    }

    fn with_redraw(mut self) -> Self {
        self.triggers_redraw = true;
        self
    }
}
