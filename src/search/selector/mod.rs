//! Per-node action selectors.
//!
//! A selector decides which action of an information-set node to explore next
//! and learns from the reward observed afterwards. Selectors never touch
//! global state: everything they learn lives either in the per-action
//! [`ActionStat`]s owned by the node, or in the selector instance owned by
//! that same node.
//!
//! Every selector explores before it exploits: while any action of a node is
//! unvisited, the lowest-indexed unvisited action is returned.

pub mod exp3;
pub mod factory;
pub mod regret;
pub mod uct;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use exp3::Exp3;
pub use factory::{SeededSelectorFactory, SelectorFactory};
pub use regret::RegretMatching;
pub use uct::Uct;

/// Statistics for one action of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStat {
    /// Times this action was taken through its node.
    pub visits: u64,
    /// Sum of the rewards observed after taking it.
    pub total_value: f64,
    /// Cumulative heuristic regret (regret matching only).
    pub regret: f64,
    /// Cumulative importance-weighted reward estimate (Exp3 only).
    pub estimate: f64,
}

impl ActionStat {
    /// Mean observed reward, zero when unvisited.
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_value / self.visits as f64
        }
    }
}

/// Capability shared by every selection strategy.
pub trait Selector {
    /// Choose the index of the next action to explore.
    fn select_action(&mut self, stats: &[ActionStat]) -> usize;

    /// Learn from `reward`, observed after taking `action`.
    ///
    /// Called before the visit and value of `action` are updated.
    fn observe_reward(&mut self, stats: &mut [ActionStat], action: usize, reward: f64);
}

/// A selector of any supported kind, owned by exactly one node.
#[derive(Debug, Clone)]
pub enum NodeSelector {
    /// See [`Uct`].
    Uct(Uct),
    /// See [`RegretMatching`].
    RegretMatching(RegretMatching),
    /// See [`Exp3`]; also covers the log-scaled variant.
    Exp3(Exp3),
}

impl Selector for NodeSelector {
    fn select_action(&mut self, stats: &[ActionStat]) -> usize {
        match self {
            NodeSelector::Uct(s) => s.select_action(stats),
            NodeSelector::RegretMatching(s) => s.select_action(stats),
            NodeSelector::Exp3(s) => s.select_action(stats),
        }
    }

    fn observe_reward(&mut self, stats: &mut [ActionStat], action: usize, reward: f64) {
        match self {
            NodeSelector::Uct(s) => s.observe_reward(stats, action, reward),
            NodeSelector::RegretMatching(s) => s.observe_reward(stats, action, reward),
            NodeSelector::Exp3(s) => s.observe_reward(stats, action, reward),
        }
    }
}

/// Smallest sampling probability an importance weight divides by.
pub const MIN_PROBABILITY: f64 = 1e-9;

/// Lowest-indexed action that was never visited.
pub fn first_unvisited(stats: &[ActionStat]) -> Option<usize> {
    stats.iter().position(|s| s.visits == 0)
}

/// Rescale `reward` from `[lo, hi]` into `[0, 1]`, clipping anything outside.
pub fn normalize(reward: f64, lo: f64, hi: f64) -> f64 {
    ((reward - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Mix a distribution with the uniform one: `(1 - gamma) * p + gamma / K`.
pub fn mix_uniform(probs: &mut [f64], gamma: f64) {
    let uniform = 1.0 / probs.len() as f64;
    for p in probs.iter_mut() {
        *p = (1.0 - gamma) * *p + gamma * uniform;
    }
}

/// Sample an action index according to a probability distribution.
pub fn sample_index<R: Rng>(probs: &[f64], rng: &mut R) -> usize {
    let r: f64 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &prob) in probs.iter().enumerate() {
        cumsum += prob;
        if r < cumsum {
            return i;
        }
    }

    // floating point slack: never land on a zero-probability action
    probs
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(probs.len() - 1)
}
