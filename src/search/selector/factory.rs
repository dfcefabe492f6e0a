//! Selector construction.
//!
//! A factory is asked for exactly one selector per node, when the node is
//! created. Every call draws one seed from the decision's random source, so
//! random draws are consumed in node-creation order and two searches with the
//! same seed build identical selectors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Exp3, NodeSelector, RegretMatching, Uct};
use crate::search::config::{SearchConfig, SelectorKind};

/// Capability to build the selector of a freshly created node.
pub trait SelectorFactory {
    /// Build the selector for a node offering `num_actions` actions.
    fn create_selector(&self, num_actions: usize, rng: &mut StdRng) -> NodeSelector;
}

/// Factory carrying the immutable hyperparameters of one search configuration.
#[derive(Debug, Clone)]
pub struct SeededSelectorFactory {
    kind: SelectorKind,
    exploration: f64,
    lo: f64,
    hi: f64,
    learning_rate: f64,
    mixing: f64,
    store_exploration: bool,
}

impl SeededSelectorFactory {
    /// Take the selector hyperparameters of a validated configuration.
    pub fn from_config(config: &SearchConfig) -> Self {
        let (lo, hi) = config.value_bounds;
        Self {
            kind: config.selector,
            exploration: config.exploration,
            lo,
            hi,
            learning_rate: config.learning_rate,
            mixing: config.mixing,
            store_exploration: config.store_exploration,
        }
    }

    /// The kind of selector this factory builds.
    pub fn kind(&self) -> SelectorKind {
        self.kind
    }
}

impl SelectorFactory for SeededSelectorFactory {
    fn create_selector(&self, _num_actions: usize, rng: &mut StdRng) -> NodeSelector {
        // drawn for every kind so the draw sequence does not depend on it
        let node_rng = StdRng::seed_from_u64(rng.gen());

        match self.kind {
            SelectorKind::Uct => NodeSelector::Uct(Uct::new(self.exploration, self.lo, self.hi)),
            SelectorKind::RegretMatching => NodeSelector::RegretMatching(RegretMatching::new(
                self.lo,
                self.hi,
                self.mixing,
                node_rng,
            )),
            SelectorKind::Exp3 => NodeSelector::Exp3(Exp3::new(
                self.lo,
                self.hi,
                self.learning_rate,
                self.mixing,
                self.store_exploration,
                node_rng,
            )),
            SelectorKind::Exp3Log => NodeSelector::Exp3(
                Exp3::new(
                    self.lo,
                    self.hi,
                    self.learning_rate,
                    self.mixing,
                    self.store_exploration,
                    node_rng,
                )
                .log_scaled(),
            ),
        }
    }
}
