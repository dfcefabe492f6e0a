//! Configuration options for the IS-MCTS engine.
//!
//! This module provides the configuration surface of a search: which selector
//! runs at every node, its hyperparameters, belief tracking, chance
//! progressive widening, and the per-decision budget.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which bandit/regret strategy chooses actions at every node.
///
/// No variant is assumed superior; all four are first-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorKind {
    /// Upper confidence bounds applied to trees.
    #[serde(rename = "uct")]
    Uct,
    /// Regret matching over importance-weighted rewards.
    #[serde(rename = "rm", alias = "regret-matching")]
    RegretMatching,
    /// Exponential weights.
    #[serde(rename = "exp3")]
    Exp3,
    /// Exponential weights over log-scaled rewards.
    #[serde(rename = "exp3-log")]
    Exp3Log,
}

impl SelectorKind {
    /// All selector kinds, in declaration order.
    pub const ALL: [SelectorKind; 4] = [
        SelectorKind::Uct,
        SelectorKind::RegretMatching,
        SelectorKind::Exp3,
        SelectorKind::Exp3Log,
    ];

    /// Whether rewards outside the value bounds are a fatal error for this
    /// selector. Regret matching clips instead.
    pub fn requires_bounded_rewards(&self) -> bool {
        !matches!(self, SelectorKind::RegretMatching)
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorKind::Uct => "uct",
            SelectorKind::RegretMatching => "rm",
            SelectorKind::Exp3 => "exp3",
            SelectorKind::Exp3Log => "exp3-log",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SelectorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uct" => Ok(SelectorKind::Uct),
            "rm" | "regret" | "regret-matching" => Ok(SelectorKind::RegretMatching),
            "exp3" => Ok(SelectorKind::Exp3),
            "exp3-log" | "exp3log" | "exp3l" => Ok(SelectorKind::Exp3Log),
            other => Err(ConfigError::UnknownSelector(other.to_string())),
        }
    }
}

/// How much search a single decision may spend.
///
/// Checked once per completed iteration; an iteration is never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SearchBudget {
    /// A fixed number of iterations.
    Iterations(u64),
    /// A wall-clock allowance.
    Time(Duration),
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::Iterations(1_000)
    }
}

/// Chance progressive widening rule: an edge may unlock its `(k+1)`-th
/// distinct child only once its visit count exceeds `coefficient * k^alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Widening {
    /// Scale of the threshold. Zero never binds.
    pub coefficient: f64,
    /// Growth exponent of the threshold.
    pub alpha: f64,
}

impl Widening {
    /// Create a widening rule.
    pub fn new(coefficient: f64, alpha: f64) -> Self {
        Self { coefficient, alpha }
    }

    /// Visit count an edge must exceed before its `(unlocked+1)`-th child.
    pub fn threshold(&self, unlocked: usize) -> f64 {
        if unlocked == 0 {
            return f64::NEG_INFINITY;
        }
        self.coefficient * (unlocked as f64).powf(self.alpha)
    }

    /// Whether an edge with `visits` visits and `unlocked` children may add one.
    pub fn allows(&self, visits: u64, unlocked: usize) -> bool {
        visits as f64 > self.threshold(unlocked)
    }
}

/// How the recommended action is read off the root after search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinalMove {
    /// The root action with the most visits.
    #[default]
    MostVisited,
    /// The root action with the highest mean value.
    BestMean,
}

/// Configuration for the IS-MCTS engine.
///
/// # Example
/// ```
/// use ismcts_solver::search::{SearchConfig, SelectorKind};
///
/// let config = SearchConfig::default().with_selector(SelectorKind::Exp3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Selector run at every information-set node.
    pub selector: SelectorKind,

    /// UCT exploration constant `c`.
    pub exploration: f64,

    /// Bounds `[lo, hi]` every terminal utility must lie in.
    ///
    /// UCT and Exp3 rescale rewards into `[0, 1]` with these bounds.
    pub value_bounds: (f64, f64),

    /// Exp3 learning rate `eta`.
    pub learning_rate: f64,

    /// Uniform mixing `gamma` folded into the sampling distribution of
    /// regret matching and Exp3. Keeps every selection probability positive.
    pub mixing: f64,

    /// Fold the Exp3 exploration term into the stored reward estimate instead
    /// of using it only for the sampling distribution.
    pub store_exploration: bool,

    /// Sample determinizations from a tracked belief instead of uniformly.
    pub use_belief: bool,

    /// Discount applied to belief action counts at the start of each decision.
    pub belief_decay: f64,

    /// Weight of the uniform distribution mixed into every belief posterior.
    pub belief_floor: f64,

    /// Chance progressive widening. `None` runs plain IS-MCTS.
    pub widening: Option<Widening>,

    /// Default per-decision budget.
    pub budget: SearchBudget,

    /// How the root recommendation is chosen.
    pub final_move: FinalMove,

    /// Keep the tree between decisions of the same match.
    pub reuse_tree: bool,

    /// Random seed for reproducibility.
    ///
    /// If `None`, each decision draws its seed from an entropy-seeded source.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            selector: SelectorKind::Uct,
            exploration: 0.7,
            value_bounds: (-1.0, 1.0),
            learning_rate: 0.1,
            mixing: 0.1,
            store_exploration: false,
            use_belief: false,
            belief_decay: 0.9,
            belief_floor: 0.05,
            widening: None,
            budget: SearchBudget::default(),
            final_move: FinalMove::MostVisited,
            reuse_tree: false,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a new SearchConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chance progressive widening with `f(k) = coefficient * k^alpha`.
    pub fn cpw(coefficient: f64, alpha: f64) -> Self {
        Self {
            widening: Some(Widening::new(coefficient, alpha)),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builder method: set the selector kind.
    pub fn with_selector(mut self, selector: SelectorKind) -> Self {
        self.selector = selector;
        self
    }

    /// Builder method: set the UCT exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder method: set the value bounds.
    pub fn with_value_bounds(mut self, lo: f64, hi: f64) -> Self {
        self.value_bounds = (lo, hi);
        self
    }

    /// Builder method: set the Exp3 learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Builder method: set the uniform mixing used by RM and Exp3.
    pub fn with_mixing(mut self, mixing: f64) -> Self {
        self.mixing = mixing;
        self
    }

    /// Builder method: fold the exploration term into stored Exp3 estimates.
    pub fn with_store_exploration(mut self, enable: bool) -> Self {
        self.store_exploration = enable;
        self
    }

    /// Builder method: enable belief-weighted determinization.
    pub fn with_belief(mut self, enable: bool) -> Self {
        self.use_belief = enable;
        self
    }

    /// Builder method: set chance progressive widening.
    pub fn with_widening(mut self, widening: Option<Widening>) -> Self {
        self.widening = widening;
        self
    }

    /// Builder method: set the default budget.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Builder method: set the final move policy.
    pub fn with_final_move(mut self, final_move: FinalMove) -> Self {
        self.final_move = final_move;
        self
    }

    /// Builder method: keep the tree between decisions.
    pub fn with_tree_reuse(mut self, enable: bool) -> Self {
        self.reuse_tree = enable;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = self.value_bounds;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(ConfigError::InvalidBounds { lo, hi });
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }

        if !(0.0..=1.0).contains(&self.mixing) {
            return Err(ConfigError::InvalidMixing(self.mixing));
        }

        if !(0.0..=1.0).contains(&self.belief_decay) {
            return Err(ConfigError::InvalidBeliefDecay(self.belief_decay));
        }

        if !(0.0..=1.0).contains(&self.belief_floor) {
            return Err(ConfigError::InvalidBeliefFloor(self.belief_floor));
        }

        if let Some(w) = self.widening {
            if !w.coefficient.is_finite() || w.coefficient < 0.0 || !w.alpha.is_finite() || w.alpha < 0.0 {
                return Err(ConfigError::InvalidWidening {
                    coefficient: w.coefficient,
                    alpha: w.alpha,
                });
            }
        }

        validate_budget(&self.budget)
    }
}

/// Reject budgets that can never run an iteration.
pub(crate) fn validate_budget(budget: &SearchBudget) -> Result<(), ConfigError> {
    match budget {
        SearchBudget::Iterations(0) => Err(ConfigError::EmptyBudget),
        SearchBudget::Time(d) if d.is_zero() => Err(ConfigError::EmptyBudget),
        _ => Ok(()),
    }
}

/// Errors that can occur when validating a search configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value bounds are not finite or `lo >= hi`.
    #[error("value bounds [{lo}, {hi}] are invalid: lo must be below hi")]
    InvalidBounds {
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        hi: f64,
    },
    /// Exploration constant is negative or not finite.
    #[error("exploration constant {0} must be finite and non-negative")]
    InvalidExploration(f64),
    /// Learning rate is not positive.
    #[error("learning rate {0} must be finite and positive")]
    InvalidLearningRate(f64),
    /// Uniform mixing is out of range [0, 1].
    #[error("mixing {0} is out of range [0, 1]")]
    InvalidMixing(f64),
    /// Belief decay is out of range [0, 1].
    #[error("belief decay {0} is out of range [0, 1]")]
    InvalidBeliefDecay(f64),
    /// Belief floor is out of range [0, 1].
    #[error("belief floor {0} is out of range [0, 1]")]
    InvalidBeliefFloor(f64),
    /// Widening parameters are negative or not finite.
    #[error("widening coefficient {coefficient} and alpha {alpha} must be finite and non-negative")]
    InvalidWidening {
        /// Threshold scale.
        coefficient: f64,
        /// Threshold exponent.
        alpha: f64,
    },
    /// Budget allows no iteration at all.
    #[error("search budget is empty")]
    EmptyBudget,
    /// Selector name not recognised.
    #[error("unknown selector kind '{0}' (expected uct, rm, exp3 or exp3-log)")]
    UnknownSelector(String),
}

/// Statistics tracked across the decisions of one searcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Decisions answered.
    pub decisions: u64,

    /// Iterations completed over all decisions.
    pub iterations: u64,

    /// Decisions answered by the zero-iteration fallback.
    pub fallbacks: u64,

    /// Nodes in the tree after the last decision.
    pub nodes: usize,

    /// Total time spent searching (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,
}

impl SearchStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        for kind in SelectorKind::ALL {
            assert!(SearchConfig::default().with_selector(kind).validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = SearchConfig::default().with_value_bounds(1.0, 1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBounds { lo: 1.0, hi: 1.0 })
        );
        let config = SearchConfig::default().with_value_bounds(2.0, -2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        let config = SearchConfig::default().with_learning_rate(-0.5);
        assert_eq!(config.validate(), Err(ConfigError::InvalidLearningRate(-0.5)));

        let config = SearchConfig::default().with_exploration(f64::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExploration(_))));

        let config = SearchConfig::default().with_mixing(1.5);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMixing(1.5)));

        let config = SearchConfig::cpw(-1.0, 0.5);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWidening { .. })));

        let config = SearchConfig::default().with_budget(SearchBudget::Iterations(0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyBudget));
    }

    #[test]
    fn test_selector_kind_parsing() {
        assert_eq!("uct".parse::<SelectorKind>(), Ok(SelectorKind::Uct));
        assert_eq!("RM".parse::<SelectorKind>(), Ok(SelectorKind::RegretMatching));
        assert_eq!("exp3".parse::<SelectorKind>(), Ok(SelectorKind::Exp3));
        assert_eq!("exp3-log".parse::<SelectorKind>(), Ok(SelectorKind::Exp3Log));
        assert_eq!(
            "thompson".parse::<SelectorKind>(),
            Err(ConfigError::UnknownSelector("thompson".to_string()))
        );
        for kind in SelectorKind::ALL {
            assert_eq!(kind.to_string().parse::<SelectorKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_widening_threshold() {
        let w = Widening::new(2.0, 0.5);
        // the first child is always allowed
        assert!(w.allows(0, 0));
        // second child needs more than 2 * 1^0.5 = 2 visits
        assert!(!w.allows(2, 1));
        assert!(w.allows(3, 1));
        // third child needs more than 2 * sqrt(2) visits
        assert!(!w.allows(2, 2));
        assert!(w.allows(3, 2));

        let never = Widening::new(0.0, 1.0);
        assert!(never.allows(1, 10));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = SearchConfig::cpw(1.0, 0.5)
            .with_selector(SelectorKind::Exp3Log)
            .with_budget(SearchBudget::Time(Duration::from_millis(25)))
            .with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SearchConfig::from_json(&json).unwrap();
        assert_eq!(parsed.selector, SelectorKind::Exp3Log);
        assert_eq!(parsed.widening, Some(Widening::new(1.0, 0.5)));
        assert_eq!(parsed.budget, SearchBudget::Time(Duration::from_millis(25)));
        assert_eq!(parsed.seed, Some(7));
        assert!(json.contains("\"selector\":\"exp3-log\""));
    }

    #[test]
    fn test_selector_names_match_command_line() {
        for kind in SelectorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
            let parsed: SelectorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string().parse::<SelectorKind>().unwrap(), kind);
        }

        let mut value = serde_json::to_value(SearchConfig::default()).unwrap();
        value["selector"] = serde_json::Value::from("rm");
        let parsed = SearchConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.selector, SelectorKind::RegretMatching);
    }
}
