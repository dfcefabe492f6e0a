//! # IS-MCTS Solver
//!
//! Information-set Monte Carlo tree search for imperfect-information games.
//!
//! ## Features
//!
//! - **Generic engine**: works with any game implementing the `Game` trait
//! - **Four selectors**: UCT, regret matching, Exp3 and log-scaled Exp3
//! - **Chance progressive widening**: caps how fast hidden-state branches open
//! - **Belief-weighted sampling**: determinizations weighted by an opponent model
//! - **Reproducible**: every decision is a function of its seed
//! - **Match harness**: seeded matches and parallel series
//!
//! ## Quick Start
//!
//! ```ignore
//! use ismcts_solver::search::{IsmctsSearch, SearchBudget, SearchConfig};
//!
//! // 1. Implement the Game trait for your game
//! // 2. Create a searcher
//! let mut search = IsmctsSearch::new(my_game, SearchConfig::default())?;
//!
//! // 3. Ask for a move
//! let result = search.choose_action(&state, SearchBudget::Iterations(1_000), 42)?;
//! ```
//!
//! ## Modules
//!
//! - [`search`]: the search engine
//! - [`matchplay`]: full matches and series between configurations
//! - [`games`]: example games (Kuhn Poker, hidden-hand bidding, costly signalling)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     IS-MCTS Engine (Generic)                    │
//! │  - Determinization sampling  - Per-node selectors               │
//! │  - Information-set tree      - Progressive widening             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                ┌──────────────┴──────────────┐
//!                │                             │
//!                ▼                             ▼
//!           ┌─────────┐                 ┌─────────────┐
//!           │  Kuhn   │                 │   Hidden    │
//!           │  Poker  │                 │   Bidding   │
//!           └─────────┘                 └─────────────┘
//! ```

#![warn(missing_docs)]

/// Information-set Monte Carlo tree search.
pub mod search;

/// Seeded matches and parallel series between search configurations.
pub mod matchplay;

/// Game implementations module.
///
/// Contains example games for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use search::{
    Action, Game, GameState, InfoState, IsmctsSearch, SearchBudget, SearchConfig, SearchError, SearchResult,
    SearchStats, SelectorKind,
};
