pub mod deck;
pub mod rules;
pub mod turns;

pub use deck::Deck;
pub use rules::{Rules, RulesError};
pub use turns::{play_match, MatchResult, Outcome};
