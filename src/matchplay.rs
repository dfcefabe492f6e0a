//! Match harness: full games between searching seats.
//!
//! Every seat gets its own [`IsmctsSearch`] with its own tree. Chance events
//! and per-decision seeds are drawn from one match-level generator seeded by
//! the match seed, so a match is a pure function of `(game, configs, seed)`.
//!
//! Series run matches in parallel with rayon. Results keep seed order no
//! matter which thread finished first.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::{ConfigError, Game, IsmctsSearch, SearchConfig, SearchError};

/// Errors that abort a match.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// A seat configuration is invalid.
    #[error("seat configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// A decision failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// One configuration per player is required.
    #[error("game has {expected} seats but {found} configurations were given")]
    SeatCount {
        /// Players in the game.
        expected: usize,
        /// Configurations supplied.
        found: usize,
    },
}

/// Result of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Seed the match was played with.
    pub seed: u64,
    /// Terminal utility per seat.
    pub utilities: Vec<f64>,
    /// Decisions taken by searching seats.
    pub decisions: usize,
    /// Decisions that fell back to a random action.
    pub fallbacks: usize,
}

/// Results of a series of matches, in seed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// One outcome per seed.
    pub outcomes: Vec<MatchOutcome>,
    /// Summed utility per seat.
    pub totals: Vec<f64>,
}

impl SeriesSummary {
    fn from_outcomes(outcomes: Vec<MatchOutcome>, seats: usize) -> Self {
        let mut totals = vec![0.0; seats];
        for outcome in &outcomes {
            for (total, u) in totals.iter_mut().zip(&outcome.utilities) {
                *total += u;
            }
        }
        Self { outcomes, totals }
    }

    /// Number of matches played.
    pub fn matches(&self) -> usize {
        self.outcomes.len()
    }

    /// Mean utility of a seat.
    pub fn mean(&self, seat: usize) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.totals[seat] / self.outcomes.len() as f64
        }
    }

    /// Matches in which `seat` scored strictly more than every other seat.
    pub fn wins(&self, seat: usize) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                o.utilities
                    .iter()
                    .enumerate()
                    .all(|(s, &u)| s == seat || o.utilities[seat] > u)
            })
            .count()
    }
}

/// Aggregate of a two-seat duel with alternating seats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelSummary {
    /// Matches played.
    pub matches: usize,
    /// Summed utility of the challenger configuration.
    pub challenger_total: f64,
    /// Summed utility of the baseline configuration.
    pub baseline_total: f64,
    /// Matches the challenger won.
    pub challenger_wins: usize,
    /// Matches the baseline won.
    pub baseline_wins: usize,
}

impl DuelSummary {
    /// Mean utility per match of the challenger.
    pub fn challenger_mean(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.challenger_total / self.matches as f64
        }
    }
}

/// Play one match.
///
/// `configs[p]` configures seat `p`; the budget of each decision is the
/// seat's configured budget.
pub fn play_match<G: Game>(game: &G, configs: &[SearchConfig], seed: u64) -> Result<MatchOutcome, MatchError> {
    if configs.len() != game.num_players() {
        return Err(MatchError::SeatCount {
            expected: game.num_players(),
            found: configs.len(),
        });
    }

    let mut searchers = configs
        .iter()
        .map(|config| IsmctsSearch::new(game.clone(), config.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = game.initial_state();
    let mut decisions = 0;
    let mut fallbacks = 0;

    while !game.is_terminal(&state) {
        if game.is_chance(&state) {
            state = game.sample_chance(&state, &mut rng);
            continue;
        }

        let player = game.current_player(&state).ok_or_else(|| SearchError::NoActingPlayer {
            state: game.state_description(&state),
        })?;
        let decision_seed = rng.gen();
        let result = searchers[player].choose_action(&state, configs[player].budget, decision_seed)?;
        decisions += 1;
        fallbacks += result.fallback as usize;
        state = game.apply_action(&state, &result.action);
    }

    let utilities = game.payoffs(&state);
    debug!("match {} finished after {} decisions: {:?}", seed, decisions, utilities);

    Ok(MatchOutcome {
        seed,
        utilities,
        decisions,
        fallbacks,
    })
}

/// Play one match per seed in parallel.
pub fn run_series<G: Game>(
    game: &G,
    configs: &[SearchConfig],
    seeds: &[u64],
) -> Result<SeriesSummary, MatchError> {
    run_series_with(game, configs, seeds, |_| {})
}

/// Like [`run_series`], calling `on_match` as each match completes.
///
/// `on_match` runs on worker threads in completion order.
pub fn run_series_with<G, F>(
    game: &G,
    configs: &[SearchConfig],
    seeds: &[u64],
    on_match: F,
) -> Result<SeriesSummary, MatchError>
where
    G: Game,
    F: Fn(&MatchOutcome) + Sync,
{
    let outcomes = seeds
        .par_iter()
        .map(|&seed| -> Result<MatchOutcome, MatchError> {
            let outcome = play_match(game, configs, seed)?;
            on_match(&outcome);
            Ok(outcome)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SeriesSummary::from_outcomes(outcomes, game.num_players()))
}

/// Pit `challenger` against `baseline` in a two-player game.
///
/// The challenger takes seat 0 on even-indexed seeds and seat 1 on odd ones.
pub fn run_duel<G: Game>(
    game: &G,
    challenger: &SearchConfig,
    baseline: &SearchConfig,
    seeds: &[u64],
) -> Result<DuelSummary, MatchError> {
    run_duel_with(game, challenger, baseline, seeds, |_| {})
}

/// Like [`run_duel`], calling `on_match` as each match completes.
pub fn run_duel_with<G, F>(
    game: &G,
    challenger: &SearchConfig,
    baseline: &SearchConfig,
    seeds: &[u64],
    on_match: F,
) -> Result<DuelSummary, MatchError>
where
    G: Game,
    F: Fn(&MatchOutcome) + Sync,
{
    if game.num_players() != 2 {
        return Err(MatchError::SeatCount {
            expected: game.num_players(),
            found: 2,
        });
    }

    let results = seeds
        .par_iter()
        .enumerate()
        .map(|(i, &seed)| -> Result<(f64, f64), MatchError> {
            let seat = i % 2;
            let configs = if seat == 0 {
                [challenger.clone(), baseline.clone()]
            } else {
                [baseline.clone(), challenger.clone()]
            };
            let outcome = play_match(game, &configs, seed)?;
            on_match(&outcome);
            Ok((outcome.utilities[seat], outcome.utilities[1 - seat]))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut summary = DuelSummary::default();
    for (mine, theirs) in results {
        summary.matches += 1;
        summary.challenger_total += mine;
        summary.baseline_total += theirs;
        if mine > theirs {
            summary.challenger_wins += 1;
        } else if theirs > mine {
            summary.baseline_wins += 1;
        }
    }
    Ok(summary)
}
