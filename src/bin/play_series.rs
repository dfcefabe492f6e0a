//! Series runner: two search configurations over a range of seeds.
//!
//! Usage:
//!   cargo run --release --bin play_series -- [OPTIONS]
//!
//! The challenger and the baseline swap seats every match. Results are
//! printed as a summary and optionally written as JSON.
//!
//! Examples:
//!   # Belief-weighted UCT against plain UCT, 100 five-round matches
//!   play_series --challenger-belief --matches 100
//!
//!   # Belief tracking in the four-round signalling game
//!   play_series --game signalling --rounds 4 --challenger-belief
//!
//!   # CPW Exp3 against regret matching in Kuhn poker
//!   play_series --game kuhn --challenger exp3 --widening 1.0 --baseline rm
//!
//! Set `RUST_LOG=debug` to log every decision.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use ismcts_solver::games::bidding::HiddenBidding;
use ismcts_solver::games::kuhn::KuhnPoker;
use ismcts_solver::games::signalling::CostlySignalling;
use ismcts_solver::matchplay::{run_duel_with, DuelSummary, MatchError};
use ismcts_solver::search::{Game, SearchBudget, SearchConfig, SelectorKind, Widening};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum GameKind {
    Bidding,
    Kuhn,
    Signalling,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a seeded series between two IS-MCTS configurations")]
struct Args {
    /// Game to play
    #[arg(long, value_enum, default_value = "bidding")]
    game: GameKind,

    /// Rounds per bidding or signalling game
    #[arg(long, default_value_t = 5)]
    rounds: usize,

    /// Matches to play
    #[arg(short, long, default_value_t = 100)]
    matches: u64,

    /// Seed of the first match; seeds are consecutive
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Iterations per decision
    #[arg(short, long, default_value_t = 500)]
    iterations: u64,

    /// Challenger selector: uct, rm, exp3 or exp3-log
    #[arg(long, default_value = "uct")]
    challenger: SelectorKind,

    /// Baseline selector: uct, rm, exp3 or exp3-log
    #[arg(long, default_value = "uct")]
    baseline: SelectorKind,

    /// Belief-weighted sampling for the challenger
    #[arg(long)]
    challenger_belief: bool,

    /// Belief-weighted sampling for the baseline
    #[arg(long)]
    baseline_belief: bool,

    /// Progressive widening coefficient for the challenger
    #[arg(long)]
    widening: Option<f64>,

    /// Progressive widening exponent
    #[arg(long, default_value_t = 0.5)]
    alpha: f64,

    /// Challenger configuration JSON file (overrides the selector flags)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Write the summary as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    game: GameKind,
    first_seed: u64,
    challenger: SearchConfig,
    baseline: SearchConfig,
    summary: DuelSummary,
    elapsed_seconds: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global() {
            eprintln!("Error configuring threads: {}", e);
            process::exit(1);
        }
    }

    let bounds = match args.game {
        GameKind::Bidding | GameKind::Signalling => (-1.0, 1.0),
        GameKind::Kuhn => (-2.0, 2.0),
    };
    let budget = SearchBudget::Iterations(args.iterations);

    let challenger = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => SearchConfig::default()
            .with_selector(args.challenger)
            .with_value_bounds(bounds.0, bounds.1)
            .with_belief(args.challenger_belief)
            .with_widening(args.widening.map(|c| Widening::new(c, args.alpha)))
            .with_budget(budget),
    };
    let baseline = SearchConfig::default()
        .with_selector(args.baseline)
        .with_value_bounds(bounds.0, bounds.1)
        .with_belief(args.baseline_belief)
        .with_budget(budget);

    println!("=================================================");
    println!("  IS-MCTS Series");
    println!("=================================================");
    println!();
    println!("Game: {:?}", args.game);
    println!("Matches: {} (seeds {}..{})", args.matches, args.seed, args.seed + args.matches);
    println!("Challenger: {}{}", challenger.selector, describe(&challenger));
    println!("Baseline: {}{}", baseline.selector, describe(&baseline));
    println!();

    let seeds: Vec<u64> = (args.seed..args.seed + args.matches).collect();
    let start = Instant::now();
    let summary = match args.game {
        GameKind::Bidding => play(&HiddenBidding::new(args.rounds), &challenger, &baseline, &seeds),
        GameKind::Kuhn => play(&KuhnPoker::new(), &challenger, &baseline, &seeds),
        GameKind::Signalling => play(&CostlySignalling::new(args.rounds), &challenger, &baseline, &seeds),
    };
    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Series aborted: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed().as_secs_f64();

    println!();
    println!("Challenger mean utility: {:+.4}", summary.challenger_mean());
    println!(
        "Wins: {} - {} ({} draws)",
        summary.challenger_wins,
        summary.baseline_wins,
        summary.matches - summary.challenger_wins - summary.baseline_wins
    );
    println!("Total time: {:.2}s", elapsed);

    if let Some(path) = &args.output {
        let report = Report {
            game: args.game,
            first_seed: args.seed,
            challenger,
            baseline,
            summary,
            elapsed_seconds: elapsed,
        };
        let written = serde_json::to_string_pretty(&report)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("Results saved to {}", path.display()),
            Err(e) => eprintln!("Error saving results: {}", e),
        }
    }
}

fn play<G: Game>(
    game: &G,
    challenger: &SearchConfig,
    baseline: &SearchConfig,
    seeds: &[u64],
) -> Result<DuelSummary, MatchError> {
    let progress = ProgressBar::new(seeds.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} matches ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    let summary = run_duel_with(game, challenger, baseline, seeds, |_| progress.inc(1));
    progress.finish();
    summary
}

fn load_config(path: &Path) -> Result<SearchConfig, String> {
    let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let config = SearchConfig::from_json(&json).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn describe(config: &SearchConfig) -> String {
    let mut parts = Vec::new();
    if config.use_belief {
        parts.push("belief".to_string());
    }
    if let Some(w) = config.widening {
        parts.push(format!("cpw c={} a={}", w.coefficient, w.alpha));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}
