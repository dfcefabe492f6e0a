//! Information-set Monte Carlo tree search.
//!
//! This module provides a generic IS-MCTS engine for imperfect-information
//! games, with optional chance progressive widening (CPW) and optional
//! belief-weighted determinization.
//!
//! # Overview
//!
//! Plain MCTS needs a fully observed state. IS-MCTS instead:
//! 1. samples a complete state consistent with what the acting player knows,
//! 2. descends a tree whose nodes are *information sets*, shared by every
//!    sampled state the player cannot tell apart,
//! 3. repeats with a fresh sample each iteration, so statistics average over
//!    the hidden information.
//!
//! # Selectors
//!
//! Each node owns one selector built by a [`SelectorFactory`]:
//!
//! - **UCT**: mean plus exploration bonus, deterministic
//! - **Regret matching**: samples in proportion to positive regret
//! - **Exp3**: exponential weights on importance-weighted rewards
//! - **Exp3-log**: Exp3 on log-scaled rewards
//!
//! # Example
//!
//! ```ignore
//! use ismcts_solver::search::{IsmctsSearch, SearchConfig, SelectorKind};
//!
//! let config = SearchConfig::cpw(1.0, 0.5).with_selector(SelectorKind::Exp3);
//! let mut search = IsmctsSearch::new(my_game, config)?;
//! let result = search.decide(&state)?;
//! ```

pub mod belief;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod selector;
pub mod tree;
pub mod widening;

pub use belief::{BeliefDistribution, BeliefTracker, DeterminizationSampler};
pub use config::{ConfigError, FinalMove, SearchBudget, SearchConfig, SearchStats, SelectorKind, Widening};
pub use engine::{IsmctsSearch, SearchResult};
pub use error::SearchError;
pub use game::{Action, Game, GameState, InfoState, PublicDecision};
pub use selector::{ActionStat, Exp3, NodeSelector, RegretMatching, SeededSelectorFactory, Selector, SelectorFactory, Uct};
pub use tree::{InfoSetNode, NodeId, SearchTree, TreeExport};
pub use widening::CpwEdge;
