use crate::card::CardRef;
use crate::game::rules::Rules;
use crate::rng::GameRng;
use log::trace;

/// A fixed multiset of cards plus the per-match zones built from it
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<CardRef>,
    draw_pile: Vec<CardRef>,
    in_play: Vec<CardRef>,
    pending_play: Option<CardRef>,
}

impl Deck {
    /// The draw pile starts in the given order; call `prep_and_shuffle` before a match
    pub fn new(cards: Vec<CardRef>) -> Self {
        Deck {
            draw_pile: cards.clone(),
            cards,
            in_play: Vec::new(),
            pending_play: None,
        }
    }

    pub fn cards(&self) -> &[CardRef] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn draw_pile(&self) -> &[CardRef] {
        &self.draw_pile
    }

    pub fn in_play(&self) -> &[CardRef] {
        &self.in_play
    }

    pub fn pending_play(&self) -> Option<&CardRef> {
        self.pending_play.as_ref()
    }

    /// Copies of the card with this short code
    pub fn count_of(&self, code: char) -> usize {
        self.cards.iter().filter(|c| c.code == code).count()
    }

    /// Sorted short codes
    pub fn codes(&self) -> Vec<char> {
        let mut codes: Vec<char> = self.cards.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes
    }

    /// Sorted short codes separated by spaces, e.g. `A A P S S`
    pub fn summary(&self) -> String {
        self.codes()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reset the board and shuffle the full deck into the draw pile
    pub fn prep_and_shuffle(&mut self, rng: &mut GameRng) {
        self.draw_pile.clear();
        self.draw_pile.extend(self.cards.iter().cloned());
        self.in_play.clear();
        self.pending_play = None;
        rng.shuffle(&mut self.draw_pile);
    }

    /// Board score, recomputed from the current board every call
    pub fn current_score(&self) -> i64 {
        self.in_play.iter().map(|c| c.points(&self.in_play)).sum()
    }

    pub fn empower_count(&self) -> u32 {
        self.in_play.iter().filter(|c| c.empowers).count() as u32
    }

    pub fn has_save(&self) -> bool {
        self.in_play.iter().any(|c| c.grants_save)
    }

    /// Draw for the round and stage the most expensive affordable card.
    ///
    /// While the cost ceiling is below `rules.redraw_cost_ceiling`, a draw
    /// containing a redraw-trigger card is reshuffled and redrawn, unless
    /// every non-trigger card left in the pile is already in the draw. Both
    /// drawn cards leave the pile; the one not played is discarded.
    pub fn select_play(&mut self, round: u32, rules: &Rules, rng: &mut GameRng) -> Option<CardRef> {
        debug_assert!(self.pending_play.is_none(), "select_play called twice without execute_play");

        let max_cost = round + self.empower_count();
        let take = rules.draws_per_round.min(self.draw_pile.len());

        while max_cost < rules.redraw_cost_ceiling {
            let triggers = self.draw_pile[..take].iter().filter(|c| c.triggers_redraw).count();
            if triggers == 0 {
                break;
            }
            let non_triggers = self.draw_pile.iter().filter(|c| !c.triggers_redraw).count();
            if take - triggers == non_triggers {
                break;
            }
            trace!("Redraw: {} trigger card(s) drawn, reshuffling", triggers);
            rng.shuffle(&mut self.draw_pile);
        }

        let drawn: Vec<CardRef> = self.draw_pile.drain(..take).collect();
        trace!(
            "Drew {}",
            drawn.iter().map(|c| c.code.to_string()).collect::<Vec<_>>().join(" and ")
        );

        // max_by_key keeps the last of equally expensive cards
        let choice = drawn
            .iter()
            .filter(|c| c.cost <= max_cost)
            .max_by_key(|c| c.cost)
            .cloned();

        match &choice {
            Some(card) => trace!("Played {}", card.code),
            None => trace!("Played nothing"),
        }
        self.pending_play = choice.clone();
        choice
    }

    /// Commit the staged card (if any) to the board
    pub fn execute_play(&mut self) {
        if let Some(card) = self.pending_play.take() {
            self.in_play.push(card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardDatabase;

    fn deck_of(db: &CardDatabase, codes: &str) -> Deck {
        Deck::new(
            codes
                .chars()
                .map(|c| db.get_by_code(c).expect("code exists"))
                .collect(),
        )
    }

    #[test]
    fn test_plays_most_expensive_affordable() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(1));

        // Round 3: Virtuous Vigilante (3) beats Gentle Guard (1)
        let mut deck = deck_of(&db, "GVPP");
        let played = deck.select_play(3, &rules, &mut rng);
        assert_eq!(played.map(|c| c.code), Some('V'));
        assert_eq!(deck.draw_pile().len(), 2, "both drawn cards leave the pile");

        deck.execute_play();
        assert_eq!(deck.in_play().len(), 1);
        assert!(deck.pending_play().is_none());
        assert_eq!(deck.current_score(), 1300);
    }

    #[test]
    fn test_nothing_affordable() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(1));

        let mut deck = deck_of(&db, "EDGG");
        assert!(deck.select_play(1, &rules, &mut rng).is_none());
        deck.execute_play();
        assert!(deck.in_play().is_empty());
        assert_eq!(deck.draw_pile().len(), 2);
    }

    #[test]
    fn test_equal_cost_keeps_later_card() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(1));

        let mut deck = deck_of(&db, "HK");
        assert_eq!(deck.select_play(2, &rules, &mut rng).map(|c| c.code), Some('K'));

        let mut deck = deck_of(&db, "KH");
        assert_eq!(deck.select_play(2, &rules, &mut rng).map(|c| c.code), Some('H'));
    }

    #[test]
    fn test_empower_raises_ceiling() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(1));

        let mut deck = deck_of(&db, "LPMG");
        assert_eq!(deck.select_play(1, &rules, &mut rng).map(|c| c.code), Some('P'));
        deck.execute_play();

        // Lotus is not in play (Pirate was chosen), so Minotaur stays out of reach at round 3
        assert_eq!(deck.empower_count(), 0);
        assert_eq!(deck.select_play(3, &rules, &mut rng).map(|c| c.code), Some('G'));

        let mut deck = deck_of(&db, "LLMG");
        deck.select_play(1, &rules, &mut rng);
        deck.execute_play();
        assert_eq!(deck.empower_count(), 1);
        assert_eq!(deck.select_play(3, &rules, &mut rng).map(|c| c.code), Some('M'));
    }

    #[test]
    fn test_redraw_avoids_trigger_cards() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(99));

        for _ in 0..50 {
            let mut deck = deck_of(&db, "AGAG");
            assert_eq!(deck.select_play(1, &rules, &mut rng).map(|c| c.code), Some('G'));
            assert!(deck.draw_pile().iter().all(|c| c.code == 'A'));
        }
    }

    #[test]
    fn test_redraw_stops_when_unavoidable() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(5));

        for _ in 0..50 {
            let mut deck = deck_of(&db, "AAG");
            assert_eq!(deck.select_play(1, &rules, &mut rng).map(|c| c.code), Some('G'));
            assert_eq!(deck.draw_pile().len(), 1);
        }

        let mut deck = deck_of(&db, "AA");
        assert!(deck.select_play(1, &rules, &mut rng).is_none());
        assert!(deck.draw_pile().is_empty());
    }

    #[test]
    fn test_no_redraw_at_high_ceiling() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(5));

        let mut deck = deck_of(&db, "AGGG");
        assert_eq!(deck.select_play(5, &rules, &mut rng).map(|c| c.code), Some('A'));
        assert_eq!(deck.draw_pile().len(), 2);
    }

    #[test]
    fn test_selected_card_never_exceeds_ceiling() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(2024));
        let all: String = db.codes().into_iter().collect();

        for _ in 0..200 {
            let mut deck = deck_of(&db, &all);
            deck.prep_and_shuffle(&mut rng);
            for round in 1..=rules.rounds {
                let ceiling = round + deck.empower_count();
                if let Some(card) = deck.select_play(round, &rules, &mut rng) {
                    assert!(card.cost <= ceiling);
                }
                deck.execute_play();
            }
            assert!(deck.draw_pile().is_empty());
        }
    }

    #[test]
    fn test_prep_resets_match_state() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(3));

        let mut deck = deck_of(&db, "GGGGPPPP");
        deck.prep_and_shuffle(&mut rng);
        deck.select_play(1, &rules, &mut rng);
        deck.execute_play();
        assert_eq!(deck.in_play().len(), 1);

        deck.prep_and_shuffle(&mut rng);
        assert!(deck.in_play().is_empty());
        assert_eq!(deck.draw_pile().len(), 8);
        assert_eq!(deck.count_of('G'), 4);
        assert_eq!(deck.summary(), "G G G G P P P P");
    }

    #[test]
    fn test_scores_follow_board() {
        let db = CardDatabase::reference();
        let rules = Rules::default();
        let mut rng = GameRng::new(Some(3));

        // Sword scores nothing until an Evil card joins it
        let mut deck = deck_of(&db, "SGGP");
        deck.select_play(3, &rules, &mut rng);
        deck.execute_play();
        assert_eq!(deck.current_score(), 0);

        deck.select_play(3, &rules, &mut rng);
        deck.execute_play();
        assert_eq!(deck.current_score(), 2700);
    }
}
