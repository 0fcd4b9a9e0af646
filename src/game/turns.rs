use crate::game::deck::Deck;
use crate::game::rules::Rules;
use crate::rng::GameRng;
use log::trace;

/// Which deck won a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    DeckA,
    DeckB,
    /// Only reachable if the tie-break perturbation lands exactly on zero
    Draw,
}

impl Outcome {
    /// +1 for deck A, -1 for deck B, 0 for a draw
    pub fn sign(&self) -> i32 {
        match self {
            Outcome::DeckA => 1,
            Outcome::DeckB => -1,
            Outcome::Draw => 0,
        }
    }
}

/// Result of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub outcome: Outcome,
    /// Round in which the match concluded
    pub rounds_played: u32,
    /// Match was cut short by the instant-win rule
    pub instant_win: bool,
    pub score_a: i64,
    pub score_b: i64,
}

impl MatchResult {
    /// Match ended before the final round
    pub fn ended_early(&self, rules: &Rules) -> bool {
        self.rounds_played < rules.rounds
    }
}

/// Play one match between two decks.
///
/// Each round both decks select, then both commit, so neither selection sees
/// the other's play. A lead of `instant_win_threshold` ends the match unless
/// the trailing deck has a save in play. Exact ties are broken by a coin flip.
pub fn play_match(deck_a: &mut Deck, deck_b: &mut Deck, rules: &Rules, rng: &mut GameRng) -> MatchResult {
    deck_a.prep_and_shuffle(rng);
    deck_b.prep_and_shuffle(rng);

    let mut rounds_played = 0;
    let mut instant_win = false;

    for round in 1..=rules.rounds {
        trace!("Round {}", round);
        rounds_played = round;

        deck_a.select_play(round, rules, rng);
        deck_b.select_play(round, rules, rng);
        deck_a.execute_play();
        deck_b.execute_play();

        let score_a = deck_a.current_score();
        let score_b = deck_b.current_score();
        trace!("Score is {} - {}", score_a, score_b);

        let point_diff = score_a - score_b;
        if point_diff.abs() >= rules.instant_win_threshold {
            let trailing_has_save = if point_diff > 0 {
                deck_b.has_save()
            } else {
                deck_a.has_save()
            };
            if !trailing_has_save {
                instant_win = true;
                break;
            }
        }
    }

    let score_a = deck_a.current_score();
    let score_b = deck_b.current_score();
    let mut point_diff = (score_a - score_b) as f64;
    if point_diff == 0.0 {
        point_diff = rng.random() - 0.5;
    }

    let outcome = if point_diff > 0.0 {
        Outcome::DeckA
    } else if point_diff < 0.0 {
        Outcome::DeckB
    } else {
        Outcome::Draw
    };
    trace!("{:?} wins in round {}", outcome, rounds_played);

    MatchResult {
        outcome,
        rounds_played,
        instant_win,
        score_a,
        score_b,
    }
}
