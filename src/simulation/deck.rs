use crate::card::{CardDatabase, CardDatabaseError, CardRef};
use crate::game::Deck;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid deck format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("No card with short code '{0}'")]
    UnknownCode(char),
    #[error("Card database error: {0}")]
    DatabaseError(#[from] CardDatabaseError),
}

/// Build a deck from short codes such as `PPPSSSSSAAAA` (whitespace ignored)
pub fn deck_from_codes(codes: &str, database: &CardDatabase) -> Result<Deck, DeckError> {
    let chars: Vec<char> = codes.chars().filter(|c| !c.is_whitespace()).collect();
    deck_from_code_list(&chars, database)
}

pub fn deck_from_code_list(codes: &[char], database: &CardDatabase) -> Result<Deck, DeckError> {
    let cards = codes
        .iter()
        .map(|&code| database.get_by_code(code).ok_or(DeckError::UnknownCode(code)))
        .collect::<Result<Vec<CardRef>, _>>()?;
    Ok(Deck::new(cards))
}

/// Deck holding one copy of every catalog card
pub fn full_catalog_deck(database: &CardDatabase) -> Deck {
    Deck::new(database.cards().to_vec())
}

/// Parse a deck file and return the deck
/// Format: "4 Card Name" per line, supports comments with # or //
pub fn parse_deck_file(path: &str, database: &CardDatabase) -> Result<Deck, DeckError> {
    let content = std::fs::read_to_string(path)?;
    parse_deck_text(&content, database)
}

pub fn parse_deck_text(content: &str, database: &CardDatabase) -> Result<Deck, DeckError> {
    let mut cards = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        let (count_str, card_name) = trimmed.split_once(' ').ok_or_else(|| DeckError::InvalidFormat {
            line: line_num + 1,
            reason: "Expected format: 'COUNT CARD_NAME'".to_string(),
        })?;

        let count: usize = count_str.parse().map_err(|_| DeckError::InvalidFormat {
            line: line_num + 1,
            reason: format!("'{}' is not a valid number", count_str),
        })?;

        let card = database.get_card(card_name.trim())?;
        cards.extend(std::iter::repeat(card).take(count));
    }

    Ok(Deck::new(cards))
}

/// Render a deck in the "COUNT Card Name" file format, catalog order
pub fn format_deck(deck: &Deck, database: &CardDatabase) -> String {
    database
        .cards()
        .iter()
        .filter_map(|card| {
            let count = deck.count_of(card.code);
            (count > 0).then(|| format!("{} {}", count, card.name))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
