use crate::card::CardDatabase;
use crate::game::{play_match, Deck, MatchResult, Outcome, Rules, RulesError};
use crate::rng::GameRng;
use crate::simulation::sampler::MultisetSampler;
use log::info;

/// Win/loss tally from the point of view of deck A
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WinRate {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl WinRate {
    pub fn record(&mut self, outcome: Outcome) {
        self.games += 1;
        match outcome {
            Outcome::DeckA => self.wins += 1,
            Outcome::DeckB => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Wins as a percentage of games played
    pub fn win_pct(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            100.0 * self.wins as f64 / self.games as f64
        }
    }
}

/// Per-card win and loss involvement above the base-rate expectation
#[derive(Debug, Clone, PartialEq)]
pub struct CardOverweight {
    pub code: char,
    pub name: String,
    pub wins: f64,
    pub losses: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CardQualityReport {
    pub runs: usize,
    pub early_endings: usize,
    pub draws: usize,
    pub cards: Vec<CardOverweight>,
}

impl CardQualityReport {
    /// Percentage of matches that ended before the final round
    pub fn early_pct(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            100.0 * self.early_endings as f64 / self.runs as f64
        }
    }

    /// Sum of win and loss overweights over the catalog; zero up to rounding
    pub fn total_overweight(&self) -> (f64, f64) {
        self.cards
            .iter()
            .fold((0.0, 0.0), |(w, l), c| (w + c.wins, l + c.losses))
    }

    /// Cards ordered from strongest to weakest overweight win signal
    pub fn ranked(&self) -> Vec<&CardOverweight> {
        let mut ranked: Vec<_> = self.cards.iter().collect();
        ranked.sort_by(|a, b| {
            (b.wins - b.losses)
                .partial_cmp(&(a.wins - a.losses))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Runs matches at scale over one generator and sampler
pub struct Evaluator<'a> {
    db: &'a CardDatabase,
    rules: Rules,
    sampler: MultisetSampler,
    rng: GameRng,
}

impl<'a> Evaluator<'a> {
    /// Fails when the number of distinct random decks overflows the sampler
    pub fn new(db: &'a CardDatabase, rules: Rules, rng: GameRng) -> Result<Self, RulesError> {
        let mut sampler = MultisetSampler::new();
        if sampler.count(db.card_count(), rules.deck_size).is_none() {
            return Err(RulesError::DeckSpaceTooLarge {
                cards: db.card_count(),
                deck_size: rules.deck_size,
            });
        }

        Ok(Evaluator { db, rules, sampler, rng })
    }

    pub fn db(&self) -> &'a CardDatabase {
        self.db
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Uniformly random deck of `rules.deck_size` catalog cards
    pub fn random_deck(&mut self) -> Deck {
        let cards = self
            .sampler
            .draw(self.db.cards(), self.rules.deck_size, &mut self.rng)
            .unwrap_or_else(|| unreachable!("deck space is checked in Evaluator::new"));
        Deck::new(cards)
    }

    pub fn play(&mut self, deck_a: &mut Deck, deck_b: &mut Deck) -> MatchResult {
        play_match(deck_a, deck_b, &self.rules, &mut self.rng)
    }

    /// Win rate of `deck` against a fresh random opponent each game
    pub fn eval_vs_random(&mut self, deck: &Deck, games: usize) -> WinRate {
        let mut deck = deck.clone();
        let mut tally = WinRate::default();

        for _ in 0..games {
            let mut opponent = self.random_deck();
            let result = self.play(&mut deck, &mut opponent);
            tally.record(result.outcome);
        }

        info!(
            "Out of {} games had {} wins, {} losses.  Win rate is {:.2}.",
            tally.games,
            tally.wins,
            tally.losses,
            tally.win_pct()
        );
        tally
    }

    /// Win rate of `deck_a` against `deck_b`; a seed restarts the generator first
    pub fn eval_comparison(&mut self, deck_a: &Deck, deck_b: &Deck, games: usize, seed: Option<u64>) -> WinRate {
        if let Some(seed) = seed {
            self.rng.reseed(seed);
        }

        let mut deck_a = deck_a.clone();
        let mut deck_b = deck_b.clone();
        let mut tally = WinRate::default();

        for _ in 0..games {
            let result = self.play(&mut deck_a, &mut deck_b);
            tally.record(result.outcome);
        }

        info!(
            "Out of {} games Deck A had {} wins, {} losses.  Win rate is {:.2}%.",
            tally.games,
            tally.wins,
            tally.losses,
            tally.win_pct()
        );
        tally
    }

    /// Overweight win/loss involvement of every catalog card across random matches.
    ///
    /// Each decided match credits every copy in the winning deck with a win and
    /// every copy in the losing deck with a loss, then subtracts the expected
    /// copies per deck (`deck_size / catalog size`) from every card's tallies.
    pub fn eval_card_quality(&mut self, runs: usize) -> CardQualityReport {
        let db = self.db;
        let catalog = db.cards();
        let expected_copies = self.rules.deck_size as f64 / catalog.len() as f64;
        let mut wins = vec![0.0; catalog.len()];
        let mut losses = vec![0.0; catalog.len()];
        let mut early_endings = 0;
        let mut draws = 0;

        for _ in 0..runs {
            let mut deck_a = self.random_deck();
            let mut deck_b = self.random_deck();
            let result = self.play(&mut deck_a, &mut deck_b);

            if result.ended_early(&self.rules) {
                early_endings += 1;
            }

            let (winner, loser) = match result.outcome {
                Outcome::DeckA => (&deck_a, &deck_b),
                Outcome::DeckB => (&deck_b, &deck_a),
                Outcome::Draw => {
                    draws += 1;
                    continue;
                }
            };

            for card in winner.cards() {
                if let Some(idx) = db.index_of(card.code) {
                    wins[idx] += 1.0;
                }
            }
            for card in loser.cards() {
                if let Some(idx) = db.index_of(card.code) {
                    losses[idx] += 1.0;
                }
            }
            for idx in 0..catalog.len() {
                wins[idx] -= expected_copies;
                losses[idx] -= expected_copies;
            }
        }

        let report = CardQualityReport {
            runs,
            early_endings,
            draws,
            cards: catalog
                .iter()
                .enumerate()
                .map(|(idx, card)| CardOverweight {
                    code: card.code,
                    name: card.name.clone(),
                    wins: wins[idx],
                    losses: losses[idx],
                })
                .collect(),
        };

        info!(
            "{:.2}% of games({}/{}) ended early",
            report.early_pct(),
            report.early_endings,
            report.runs
        );
        for card in &report.cards {
            info!(
                "{} overweight is involved in {:.1} wins and {:.1} losses",
                card.name, card.wins, card.losses
            );
        }
        report
    }
}
