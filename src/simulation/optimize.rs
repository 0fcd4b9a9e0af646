use crate::card::CardDatabase;
use crate::game::Deck;
use crate::simulation::deck::{deck_from_code_list, format_deck, DeckError};
use crate::simulation::engine::Evaluator;
use crate::simulation::SimulationError;
use log::info;

/// An accepted hill-climbing step
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub from_pct: f64,
    pub to_pct: f64,
    pub codes: Vec<char>,
}

#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    /// Best deck found, sorted short codes
    pub codes: Vec<char>,
    pub start_pct: f64,
    pub win_pct: f64,
    pub improvements: Vec<Improvement>,
    pub evaluations: usize,
}

/// Every deck reachable by swapping one held card for a different allowed card.
/// Each result is sorted.
pub fn list_possible_replacements(codes: &[char], allowed: &[char]) -> Vec<Vec<char>> {
    let mut held: Vec<char> = Vec::new();
    for &code in codes {
        if !held.contains(&code) {
            held.push(code);
        }
    }

    let mut possibilities = Vec::new();
    for &remove in &held {
        for &add in allowed {
            if add == remove {
                continue;
            }
            let mut new_codes = codes.to_vec();
            if let Some(pos) = new_codes.iter().position(|&c| c == remove) {
                new_codes.remove(pos);
            }
            new_codes.push(add);
            new_codes.sort_unstable();
            possibilities.push(new_codes);
        }
    }
    possibilities
}

/// Greedy single-swap hill climb of `base` against `opponent`.
///
/// Every candidate is scored with the comparison evaluator restarted from
/// `seed`, so scores are comparable. The first improving swap of a shuffled
/// pass is taken; the search stops after a full pass without improvement.
/// `allowed` limits the cards that may be added (default: whole catalog).
pub fn optimize_versus(
    evaluator: &mut Evaluator,
    base: &[char],
    opponent: &Deck,
    allowed: Option<&[char]>,
    seed: u64,
    games: usize,
) -> Result<OptimizeOutcome, DeckError> {
    let db = evaluator.db();
    let allowed: Vec<char> = match allowed {
        Some(codes) => codes.to_vec(),
        None => db.codes(),
    };
    if let Some(&unknown) = allowed.iter().find(|&&c| db.get_by_code(c).is_none()) {
        return Err(DeckError::UnknownCode(unknown));
    }

    let mut codes = base.to_vec();
    codes.sort_unstable();
    let base_deck = deck_from_code_list(&codes, db)?;
    info!("Evaluating deck: {:?}", codes);

    let start_pct = evaluator.eval_comparison(&base_deck, opponent, games, Some(seed)).win_pct();
    let mut best_pct = start_pct;
    let mut improvements = Vec::new();
    let mut evaluations = 1;

    loop {
        let mut candidates = list_possible_replacements(&codes, &allowed);
        evaluator.rng_mut().shuffle(&mut candidates);

        let mut improved = false;
        for candidate in candidates {
            let deck = deck_from_code_list(&candidate, db)?;
            let pct = evaluator.eval_comparison(&deck, opponent, games, Some(seed)).win_pct();
            evaluations += 1;

            if pct > best_pct {
                info!("Improved from {:.2} to {:.2} with deck: {:?}", best_pct, pct, candidate);
                improvements.push(Improvement {
                    from_pct: best_pct,
                    to_pct: pct,
                    codes: candidate.clone(),
                });
                best_pct = pct;
                codes = candidate;
                improved = true;
                break;
            }
        }

        if !improved {
            break;
        }
    }

    Ok(OptimizeOutcome {
        codes,
        start_pct,
        win_pct: best_pct,
        improvements,
        evaluations,
    })
}

/// Metadata written above an optimized deck
pub struct DeckSaveParams<'a> {
    pub opponent: &'a Deck,
    pub win_pct: f64,
    pub games: usize,
    pub seed: u64,
}

/// Save a deck in the "COUNT Card Name" format with an optimization header.
/// Without a path, a timestamped file name is used. Returns the file name.
pub fn save_deck_to_file(
    path: Option<&str>,
    codes: &[char],
    db: &CardDatabase,
    params: &DeckSaveParams,
) -> Result<String, SimulationError> {
    let now = chrono::Local::now();
    let filename = match path {
        Some(p) => p.to_string(),
        None => format!("optimized_deck_{}.txt", now.format("%Y%m%d_%H%M%S")),
    };

    let deck = deck_from_code_list(codes, db)?;
    let content = format!(
        "# Optimized against: {}\n# Win rate: {:.2}% over {} games (seed {})\n# Generated: {}\n{}\n",
        params.opponent.summary(),
        params.win_pct,
        params.games,
        params.seed,
        now.format("%Y-%m-%d %H:%M:%S"),
        format_deck(&deck, db)
    );
    std::fs::write(&filename, content)?;
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Rules;
    use crate::rng::GameRng;
    use crate::simulation::deck::{deck_from_codes, full_catalog_deck, parse_deck_file};

    #[test]
    fn test_replacements() {
        let codes = ['A', 'A', 'B'];
        let options = list_possible_replacements(&codes, &['A', 'B', 'C']);

        // remove A: add B or C; remove B: add A or C
        assert_eq!(options.len(), 4);
        assert!(options.contains(&vec!['A', 'B', 'B']));
        assert!(options.contains(&vec!['A', 'B', 'C']));
        assert!(options.contains(&vec!['A', 'A', 'A']));
        assert!(options.contains(&vec!['A', 'A', 'C']));
        assert!(options.iter().all(|o| o.len() == 3));
    }

    #[test]
    fn test_optimizer_climbs_and_is_reproducible() {
        let db = CardDatabase::reference();
        let opponent = deck_from_codes("PPPPPPPPPPPP", &db).expect("valid codes");
        let base: Vec<char> = "GGGGGGGGGGGG".chars().collect();
        let allowed = ['G', 'P', 'S', 'V'];

        let run = || {
            let mut eval = Evaluator::new(&db, Rules::default(), GameRng::new(Some(1))).expect("deck space fits");
            optimize_versus(&mut eval, &base, &opponent, Some(&allowed[..]), 77, 200).expect("valid codes")
        };
        let outcome = run();

        assert!(outcome.win_pct > outcome.start_pct, "guard mirror should be improvable");
        assert_eq!(outcome.codes.len(), 12);
        assert!(outcome.codes.iter().all(|c| allowed.contains(c)));
        assert!(outcome.improvements.windows(2).all(|w| w[0].to_pct < w[1].to_pct));
        assert_eq!(outcome.improvements.last().map(|i| i.codes.clone()), Some(outcome.codes.clone()));

        let again = run();
        assert_eq!(again.codes, outcome.codes);
        assert_eq!(again.evaluations, outcome.evaluations);
    }

    #[test]
    fn test_optimizer_rejects_unknown_codes() {
        let db = CardDatabase::reference();
        let mut eval = Evaluator::new(&db, Rules::default(), GameRng::new(Some(1))).expect("deck space fits");
        let opponent = full_catalog_deck(&db);

        let result = optimize_versus(&mut eval, &['G'; 12], &opponent, Some(&['G', 'Z'][..]), 1, 10);
        assert!(matches!(result, Err(DeckError::UnknownCode('Z'))));
    }

    #[test]
    fn test_save_deck_to_file() {
        let db = CardDatabase::reference();
        let opponent = full_catalog_deck(&db);
        let path = std::env::temp_dir().join(format!("duel-sim-opt-{}.txt", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let params = DeckSaveParams { opponent: &opponent, win_pct: 61.5, games: 1000, seed: 3 };
        let codes: Vec<char> = "GGGGBBBBBBBB".chars().collect();
        let written = save_deck_to_file(Some(&path), &codes, &db, &params).expect("deck saved");
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).expect("file readable");
        assert!(content.contains("# Win rate: 61.50% over 1000 games (seed 3)"));

        let deck = parse_deck_file(&path, &db).expect("saved deck parses");
        assert_eq!(deck.count_of('G'), 4);
        assert_eq!(deck.count_of('B'), 8);

        std::fs::remove_file(&path).ok();
    }
}
