use clap::{ArgAction, Parser, Subcommand};
use duel_sim::card::CardDatabase;
use duel_sim::game::{Deck, Rules};
use duel_sim::rng::{parse_seed, GameRng, REFERENCE_SEED_PHRASE};
use duel_sim::simulation::deck::{deck_from_codes, full_catalog_deck, parse_deck_file};
use duel_sim::simulation::engine::Evaluator;
use duel_sim::simulation::match_log::write_match_log;
use duel_sim::simulation::optimize::{optimize_versus, save_deck_to_file, DeckSaveParams};
use duel_sim::simulation::tournament::{load_roster, round_robin, run_pve};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::path::Path;

#[derive(Parser)]
#[command(name = "duel-sim")]
#[command(about = "Monte Carlo deck evaluator for a simplified card duel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Card catalog JSON (defaults to the built-in catalog)
    #[arg(long, global = true)]
    cards: Option<String>,

    /// Rules JSON (defaults to the reference rules)
    #[arg(long, global = true)]
    rules: Option<String>,

    /// Seed for reproducibility: an integer or a phrase
    #[arg(short, long, global = true, default_value = REFERENCE_SEED_PHRASE)]
    seed: String,

    /// Log evaluation summaries (-v) or every round (-vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a CSV log of matches between random decks
    Log {
        /// Number of matches to log
        #[arg(short, long, default_value = "10000")]
        rows: usize,

        /// Output CSV file
        #[arg(short, long, default_value = "mtg_output.csv")]
        output: String,

        /// Append to an existing log instead of recreating it
        #[arg(long)]
        append: bool,

        /// First game id
        #[arg(long, default_value = "0")]
        start_id: usize,
    },

    /// Evaluate a deck against random opponents
    VsRandom {
        /// Deck file or short codes (e.g. PPPSSSSSAAAA)
        deck: String,

        #[arg(short, long, default_value = "10000")]
        num_games: usize,
    },

    /// Compare two decks head to head
    Compare {
        deck1: String,
        deck2: String,

        #[arg(short, long, default_value = "10000")]
        num_games: usize,
    },

    /// Report per-card overweight win/loss involvement
    Quality {
        #[arg(short, long, default_value = "10000")]
        runs: usize,
    },

    /// Evaluate every roster deck against the NPC deck
    Pve {
        #[arg(short, long, default_value = "players.json")]
        roster: String,

        #[arg(short, long, default_value = "10000")]
        num_games: usize,
    },

    /// Round-robin between roster decks, written as a percentage matrix
    Pvp {
        #[arg(short, long, default_value = "players.json")]
        roster: String,

        #[arg(short, long, default_value = "10000")]
        num_games: usize,

        #[arg(short, long, default_value = "mtg_pvp_output.csv")]
        output: String,
    },

    /// Hill-climb a deck against a fixed opponent by single-card swaps
    Optimize {
        /// Starting deck (file or short codes)
        base: String,

        /// Opponent deck (file or short codes); defaults to one of every card
        #[arg(short, long)]
        opponent: Option<String>,

        /// Short codes allowed to be added, e.g. PSAHD
        #[arg(short, long)]
        allowed: Option<String>,

        #[arg(short, long, default_value = "10000")]
        num_games: usize,

        /// Save the best deck to this file
        #[arg(long)]
        save: Option<String>,
    },

    /// Evaluate the reference test decks against random decks and each other
    Demo {
        #[arg(short, long, default_value = "10000")]
        num_games: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let db = match &cli.cards {
        Some(path) => {
            let db = CardDatabase::from_file(path)?;
            eprintln!("✓ Loaded {} cards from {}", db.card_count(), path);
            db
        }
        None => CardDatabase::reference(),
    };
    let rules = match &cli.rules {
        Some(path) => Rules::from_file(path)?,
        None => Rules::default(),
    };
    let seed = parse_seed(&cli.seed);

    match cli.command.unwrap_or(Commands::Demo { num_games: 10000 }) {
        Commands::Log { rows, output, append, start_id } => {
            let mut evaluator = Evaluator::new(&db, rules, GameRng::new(Some(seed)))?;
            let progress = ProgressBar::new(rows as u64);
            progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} matches ({eta})")?);

            write_match_log(Path::new(&output), rows, start_id, append, &mut evaluator, &progress)?;
            progress.finish_and_clear();
            println!("Wrote {} matches to {}", rows, output);
        }
        Commands::VsRandom { deck, num_games } => {
            let deck = load_deck(&deck, &db)?;
            let mut evaluator = Evaluator::new(&db, rules, GameRng::new(Some(seed)))?;
            let result = evaluator.eval_vs_random(&deck, num_games);
            println!("{}", deck.summary());
            println!(
                "Out of {} games had {} wins, {} losses.  Win rate is {:.2}.",
                result.games,
                result.wins,
                result.losses,
                result.win_pct()
            );
        }
        Commands::Compare { deck1, deck2, num_games } => {
            let deck_a = load_deck(&deck1, &db)?;
            let deck_b = load_deck(&deck2, &db)?;
            let mut evaluator = Evaluator::new(&db, rules, GameRng::new(Some(seed)))?;
            let result = evaluator.eval_comparison(&deck_a, &deck_b, num_games, Some(seed));
            println!("{}", deck_a.summary());
            println!("VS");
            println!("{}", deck_b.summary());
            println!(
                "Out of {} games Deck A had {} wins, {} losses.  Win rate is {:.2}%.",
                result.games,
                result.wins,
                result.losses,
                result.win_pct()
            );
        }
        Commands::Quality { runs } => {
            let mut evaluator = Evaluator::new(&db, rules, GameRng::new(Some(seed)))?;
            let report = evaluator.eval_card_quality(runs);

            println!(
                "{:.2}% of games({}/{}) ended early\n",
                report.early_pct(),
                report.early_endings,
                report.runs
            );
            println!("{:60} {:>10} {:>10}", "Card", "Wins", "Losses");
            println!("{:-<82}", "");
            for card in report.ranked() {
                println!("{:60} {:>10.1} {:>10.1}", card.name, card.wins, card.losses);
            }
        }
        Commands::Pve { roster, num_games } => {
            let players = load_roster(&roster, &db)?;
            let npc = full_catalog_deck(&db);
            for entry in run_pve(&players, &npc, &db, &rules, num_games, seed)? {
                println!("Evaluating submission of {}:", entry.player);
                println!("{}", entry.deck_summary);
                println!(
                    "Out of {} games Deck A had {} wins, {} losses.  Win rate is {:.2}%.\n",
                    entry.result.games,
                    entry.result.wins,
                    entry.result.losses,
                    entry.result.win_pct()
                );
            }
        }
        Commands::Pvp { roster, num_games, output } => {
            let players = load_roster(&roster, &db)?;
            let standings = round_robin(&players, &db, &rules, num_games, seed)?;
            standings.write_csv(&output)?;
            print!("{}", standings.to_csv());
            println!("\nStandings written to {}", output);
        }
        Commands::Optimize { base, opponent, allowed, num_games, save } => {
            let base_deck = load_deck(&base, &db)?;
            let opponent = match opponent {
                Some(arg) => load_deck(&arg, &db)?,
                None => full_catalog_deck(&db),
            };
            let allowed: Option<Vec<char>> = allowed.map(|a| a.chars().filter(|c| !c.is_whitespace()).collect());

            let mut evaluator = Evaluator::new(&db, rules, GameRng::new(Some(seed)))?;
            let start = std::time::Instant::now();
            let outcome = optimize_versus(
                &mut evaluator,
                &base_deck.codes(),
                &opponent,
                allowed.as_deref(),
                seed,
                num_games,
            )?;

            println!("Starting win rate: {:.2}%", outcome.start_pct);
            for step in &outcome.improvements {
                println!(
                    "Improved from {:.2} to {:.2} with deck: {}",
                    step.from_pct,
                    step.to_pct,
                    step.codes.iter().collect::<String>()
                );
            }
            println!(
                "\nBest deck: {} ({:.2}%) after {} evaluations in {:.2?}",
                outcome.codes.iter().collect::<String>(),
                outcome.win_pct,
                outcome.evaluations,
                start.elapsed()
            );

            if let Some(path) = save {
                let params = DeckSaveParams {
                    opponent: &opponent,
                    win_pct: outcome.win_pct,
                    games: num_games,
                    seed,
                };
                let filename = save_deck_to_file(Some(&path), &outcome.codes, &db, &params)?;
                println!("Best deck saved to: {}", filename);
            }
        }
        Commands::Demo { num_games } => run_demo(&db, rules, seed, num_games)?,
    }

    Ok(())
}

/// A deck argument is a deck file if it exists, otherwise short codes
fn load_deck(arg: &str, db: &CardDatabase) -> Result<Deck, Box<dyn Error>> {
    let deck = if Path::new(arg).is_file() {
        parse_deck_file(arg, db)?
    } else {
        deck_from_codes(arg, db)?
    };
    Ok(deck)
}

fn run_demo(db: &CardDatabase, rules: Rules, seed: u64, num_games: usize) -> Result<(), Box<dyn Error>> {
    let test_decks = vec![
        full_catalog_deck(db),
        deck_from_codes("PPPSSSSSAAAA", db)?,
        deck_from_codes("GGGGGGBBBBBB", db)?,
        deck_from_codes("LLLLLEEEEAAA", db)?,
    ];
    let mut evaluator = Evaluator::new(db, rules, GameRng::new(Some(seed)))?;

    println!("=== Versus random decks ===\n");
    for deck in &test_decks {
        let result = evaluator.eval_vs_random(deck, num_games);
        println!("{:24} {:>6.2}%", deck.summary(), result.win_pct());
    }

    println!("\n=== Head to head ===\n");
    for (i, deck_a) in test_decks.iter().enumerate() {
        for deck_b in &test_decks[i + 1..] {
            let result = evaluator.eval_comparison(deck_a, deck_b, num_games, None);
            println!("{}", deck_a.summary());
            println!("VS");
            println!("{}", deck_b.summary());
            println!("Deck A win rate: {:.2}%\n", result.win_pct());
        }
    }
    Ok(())
}
