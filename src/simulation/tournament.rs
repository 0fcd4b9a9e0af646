//! Roster evaluation: every player deck against the NPC deck, and a
//! round-robin between all player decks.
//!
//! Matchups are independent, so they run in parallel; each one gets its own
//! generator seeded from the tournament seed, which keeps results identical
//! regardless of scheduling.

use crate::card::CardDatabase;
use crate::game::{Deck, Rules};
use crate::rng::GameRng;
use crate::simulation::deck::deck_from_codes;
use crate::simulation::engine::{Evaluator, WinRate};
use crate::simulation::SimulationError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Roster entry as stored in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub player: String,
    /// Short codes, e.g. "PPPSSSSSAAAA"
    pub deck: String,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub deck: Deck,
}

pub fn load_roster(path: &str, db: &CardDatabase) -> Result<Vec<Player>, SimulationError> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<PlayerEntry> = serde_json::from_str(&content)?;
    roster_from_entries(&entries, db)
}

pub fn roster_from_entries(entries: &[PlayerEntry], db: &CardDatabase) -> Result<Vec<Player>, SimulationError> {
    entries
        .iter()
        .map(|entry| -> Result<Player, SimulationError> {
            Ok(Player {
                name: entry.player.clone(),
                deck: deck_from_codes(&entry.deck, db)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PveResult {
    pub player: String,
    pub deck_summary: String,
    pub result: WinRate,
}

/// Every player deck against `npc`, each evaluated from a fresh `seed`
pub fn run_pve(
    players: &[Player],
    npc: &Deck,
    db: &CardDatabase,
    rules: &Rules,
    games: usize,
    seed: u64,
) -> Result<Vec<PveResult>, SimulationError> {
    players
        .par_iter()
        .map(|player| -> Result<PveResult, SimulationError> {
            let mut evaluator = Evaluator::new(db, rules.clone(), GameRng::new(Some(seed)))?;
            let result = evaluator.eval_comparison(&player.deck, npc, games, Some(seed));
            Ok(PveResult {
                player: player.name.clone(),
                deck_summary: player.deck.summary(),
                result,
            })
        })
        .collect()
}

/// Round-robin win percentages, rows and columns in standings order
#[derive(Debug, Clone)]
pub struct Standings {
    pub names: Vec<String>,
    /// `matchups[i][j]`: win percentage of player i against player j
    pub matchups: Vec<Vec<f64>>,
    /// Sum of a player's matchup percentages divided by 100
    pub totals: Vec<f64>,
}

impl Standings {
    pub fn to_csv(&self) -> String {
        let mut out = format!("Player,{},Total Score\n", self.names.join(","));
        for (i, name) in self.names.iter().enumerate() {
            let cells: Vec<String> = self.matchups[i].iter().map(|pct| format!("{:.2}%", pct)).collect();
            out.push_str(&format!("{},{},{:.2}\n", name, cells.join(","), self.totals[i]));
        }
        out
    }

    pub fn write_csv(&self, path: &str) -> Result<(), SimulationError> {
        std::fs::write(path, self.to_csv())?;
        Ok(())
    }
}

/// Evaluate every unordered pair once; a deck against itself counts as 50%
pub fn round_robin(
    players: &[Player],
    db: &CardDatabase,
    rules: &Rules,
    games: usize,
    seed: u64,
) -> Result<Standings, SimulationError> {
    let n = players.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let results: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| -> Result<(usize, usize, f64), SimulationError> {
            let mut evaluator = Evaluator::new(db, rules.clone(), GameRng::new(Some(seed)))?;
            let tally = evaluator.eval_comparison(&players[i].deck, &players[j].deck, games, Some(seed));
            Ok((i, j, tally.win_pct()))
        })
        .collect::<Result<_, _>>()?;

    let mut matchups = vec![vec![50.0; n]; n];
    for (i, j, pct) in results {
        matchups[i][j] = pct;
        matchups[j][i] = 100.0 - pct;
    }
    let totals: Vec<f64> = matchups.iter().map(|row| row.iter().sum::<f64>() / 100.0).collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| totals[b].partial_cmp(&totals[a]).unwrap_or(std::cmp::Ordering::Equal));

    Ok(Standings {
        names: order.iter().map(|&i| players[i].name.clone()).collect(),
        matchups: order
            .iter()
            .map(|&i| order.iter().map(|&j| matchups[i][j]).collect())
            .collect(),
        totals: order.iter().map(|&i| totals[i]).collect(),
    })
}
