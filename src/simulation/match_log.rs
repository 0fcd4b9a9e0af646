//! Bulk CSV log of random matches: per-card counts for both decks plus the winner.

use crate::card::CardDatabase;
use crate::game::{Deck, MatchResult, Outcome};
use crate::simulation::engine::Evaluator;
use crate::simulation::SimulationError;
use indicatif::ProgressBar;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct MatchLog<'a> {
    db: &'a CardDatabase,
    writer: BufWriter<File>,
}

impl<'a> MatchLog<'a> {
    /// Truncate `path` and write the header row
    pub fn create(path: &Path, db: &'a CardDatabase) -> Result<Self, SimulationError> {
        let mut log = MatchLog {
            db,
            writer: BufWriter::new(File::create(path)?),
        };
        let header = header_row(db);
        log.write_row(&header)?;
        Ok(log)
    }

    /// Append rows to an existing log without touching the header
    pub fn append(path: &Path, db: &'a CardDatabase) -> Result<Self, SimulationError> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(MatchLog {
            db,
            writer: BufWriter::new(file),
        })
    }

    pub fn write_match(&mut self, game_id: usize, deck_a: &Deck, deck_b: &Deck, result: &MatchResult) -> Result<(), SimulationError> {
        let row = match_row(self.db, game_id, deck_a, deck_b, result);
        self.write_row(&row)
    }

    pub fn finish(mut self) -> Result<(), SimulationError> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, row: &[String]) -> Result<(), SimulationError> {
        writeln!(self.writer, "{}", row.join(","))?;
        Ok(())
    }
}

pub fn header_row(db: &CardDatabase) -> Vec<String> {
    let mut row = vec!["Game ID".to_string()];
    row.extend(db.cards().iter().map(|c| format!("{}_Deck_A_Count", c.column_name())));
    row.extend(db.cards().iter().map(|c| format!("{}_Deck_B_Count", c.column_name())));
    row.push("Deck_A_Win?".to_string());
    row.push("Deck_B_Win?".to_string());
    row
}

pub fn match_row(db: &CardDatabase, game_id: usize, deck_a: &Deck, deck_b: &Deck, result: &MatchResult) -> Vec<String> {
    let mut row = vec![game_id.to_string()];
    row.extend(db.cards().iter().map(|c| deck_a.count_of(c.code).to_string()));
    row.extend(db.cards().iter().map(|c| deck_b.count_of(c.code).to_string()));
    row.push(u8::from(result.outcome == Outcome::DeckA).to_string());
    row.push(u8::from(result.outcome == Outcome::DeckB).to_string());
    row
}

/// Play `rows` matches between fresh random decks and log each one.
/// Game ids start at `first_id`; the file is recreated unless `append` is set.
pub fn write_match_log(
    path: &Path,
    rows: usize,
    first_id: usize,
    append: bool,
    evaluator: &mut Evaluator,
    progress: &ProgressBar,
) -> Result<(), SimulationError> {
    let db = evaluator.db();
    let mut log = if append {
        MatchLog::append(path, db)?
    } else {
        MatchLog::create(path, db)?
    };

    for game_id in first_id..first_id + rows {
        let mut deck_a = evaluator.random_deck();
        let mut deck_b = evaluator.random_deck();
        let result = evaluator.play(&mut deck_a, &mut deck_b);
        log.write_match(game_id, &deck_a, &deck_b, &result)?;
        progress.inc(1);
    }

    log.finish()
}
