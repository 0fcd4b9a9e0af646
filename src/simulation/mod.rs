pub mod deck;
pub mod engine;
pub mod match_log;
pub mod optimize;
pub mod sampler;
pub mod tournament;

pub use deck::{deck_from_codes, parse_deck_file, DeckError};
pub use engine::{CardOverweight, CardQualityReport, Evaluator, WinRate};
pub use sampler::MultisetSampler;

use crate::game::RulesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Deck error: {0}")]
    DeckError(#[from] DeckError),
    #[error("Rules error: {0}")]
    RulesError(#[from] RulesError),
}
