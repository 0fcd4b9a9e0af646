use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable catalog card
pub type CardRef = Arc<Card>;

/// Card alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Good,
    Evil,
    Artifact,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Good => write!(f, "Good"),
            Alignment::Evil => write!(f, "Evil"),
            Alignment::Artifact => write!(f, "Artifact"),
        }
    }
}

/// Which cards on the board a scoring rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFilter {
    Any,
    Alignment(Alignment),
}

impl BoardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            BoardFilter::Any => true,
            BoardFilter::Alignment(alignment) => card.alignment == *alignment,
        }
    }

    pub fn count(&self, board: &[CardRef]) -> usize {
        board.iter().filter(|c| self.matches(c)).count()
    }
}

/// Points a card contributes, evaluated against the current board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreRule {
    /// Fixed value regardless of the board
    Flat { points: i64 },
    /// `points` for every card in play matching the filter (itself included)
    PerMatching { points: i64, filter: BoardFilter },
    /// `points` if at least one card in play matches the filter, else zero
    IfAny { points: i64, filter: BoardFilter },
}

impl ScoreRule {
    pub fn points(&self, board: &[CardRef]) -> i64 {
        match self {
            ScoreRule::Flat { points } => *points,
            ScoreRule::PerMatching { points, filter } => points * filter.count(board) as i64,
            ScoreRule::IfAny { points, filter } => {
                if board.iter().any(|c| filter.matches(c)) {
                    *points
                } else {
                    0
                }
            }
        }
    }
}

/// Catalog entry as written in a cards JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDef {
    pub name: String,
    pub cost: u32,
    pub alignment: Alignment,
    pub score: ScoreRule,
    /// Overrides the short code (defaults to the first letter of the name)
    #[serde(default)]
    pub code: Option<char>,
    #[serde(default)]
    pub empowers: bool,
    #[serde(default)]
    pub grants_save: bool,
    #[serde(default)]
    pub triggers_redraw: bool,
}

/// Immutable card used by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub code: char,
    pub name: String,
    pub cost: u32,
    pub alignment: Alignment,
    pub score: ScoreRule,
    /// Raises its controller's playable cost ceiling while in play
    pub empowers: bool,
    /// Cancels the instant loss from a point deficit while in play
    pub grants_save: bool,
    /// A draw containing this card may be reshuffled and redrawn
    pub triggers_redraw: bool,
}

impl Card {
    /// Build a card from its definition, deriving the short code from the name
    pub fn from_def(def: CardDef) -> Option<Card> {
        let code = def.code.or_else(|| def.name.chars().next())?;
        Some(Card {
            code,
            name: def.name,
            cost: def.cost,
            alignment: def.alignment,
            score: def.score,
            empowers: def.empowers,
            grants_save: def.grants_save,
            triggers_redraw: def.triggers_redraw,
        })
    }

    /// Points this card is worth on the given board
    pub fn points(&self, board: &[CardRef]) -> i64 {
        self.score.points(board)
    }

    /// Column-safe version of the name for CSV headers
    pub fn column_name(&self) -> String {
        self.name.replace(',', "").replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, alignment: Alignment, score: ScoreRule) -> CardRef {
        Arc::new(
            Card::from_def(CardDef {
                name: name.to_string(),
                cost: 1,
                alignment,
                score,
                code: None,
                empowers: false,
                grants_save: false,
                triggers_redraw: false,
            })
            .expect("name is not empty"),
        )
    }

    #[test]
    fn test_code_derived_from_name() {
        let c = card("Gentle Guard", Alignment::Good, ScoreRule::Flat { points: 700 });
        assert_eq!(c.code, 'G');
        assert_eq!(c.column_name(), "Gentle_Guard");
    }

    #[test]
    fn test_empty_name_has_no_code() {
        let def = CardDef {
            name: String::new(),
            cost: 0,
            alignment: Alignment::Good,
            score: ScoreRule::Flat { points: 0 },
            code: None,
            empowers: false,
            grants_save: false,
            triggers_redraw: false,
        };
        assert!(Card::from_def(def).is_none());
    }

    #[test]
    fn test_per_matching_counts_whole_board() {
        let battalion = card(
            "Bold Battalion",
            Alignment::Good,
            ScoreRule::PerMatching { points: 600, filter: BoardFilter::Alignment(Alignment::Good) },
        );
        let guard = card("Gentle Guard", Alignment::Good, ScoreRule::Flat { points: 700 });
        let pirate = card("Patchy Pirate", Alignment::Evil, ScoreRule::Flat { points: 700 });

        assert_eq!(battalion.points(&[battalion.clone()]), 600);
        let board = vec![battalion.clone(), guard, pirate];
        assert_eq!(battalion.points(&board), 1200);
    }

    #[test]
    fn test_if_any_is_gated() {
        let sword = card(
            "Sword of Shadows",
            Alignment::Artifact,
            ScoreRule::IfAny { points: 2000, filter: BoardFilter::Alignment(Alignment::Evil) },
        );
        let pirate = card("Patchy Pirate", Alignment::Evil, ScoreRule::Flat { points: 700 });

        assert_eq!(sword.points(&[sword.clone()]), 0);
        assert_eq!(sword.points(&[sword.clone(), pirate]), 2000);
    }

    #[test]
    fn test_score_rule_json() {
        let json = r#"{"kind":"if_any","points":2000,"filter":{"alignment":"Evil"}}"#;
        let rule: ScoreRule = serde_json::from_str(json).expect("valid rule");
        assert_eq!(
            rule,
            ScoreRule::IfAny { points: 2000, filter: BoardFilter::Alignment(Alignment::Evil) }
        );

        let flat: ScoreRule = serde_json::from_str(r#"{"kind":"flat","points":5}"#).expect("valid rule");
        assert_eq!(flat, ScoreRule::Flat { points: 5 });
    }
}
