//! Exp3 and its log-scaled variant.
//!
//! The sampling policy is a softmax of the cumulative reward estimates mixed
//! with uniform exploration:
//!
//! ```text
//! q(a) = exp(eta * G(a)) / sum_b exp(eta * G(b))
//! p(a) = (1 - gamma) * q(a) + gamma / K
//! ```
//!
//! Estimates are importance weighted, `x / p(a)`, so they stay unbiased. With
//! `store_exploration` the stored increment is scaled by the exploration term
//! `gamma / K` (classic Exp3); without it the raw estimate is stored and
//! `gamma` only shapes the sampling distribution.
//!
//! The log-scaled variant maps rewards through `ln(1 + (r - lo))` before
//! weighting, which compresses heavy-tailed value ranges.

use rand::rngs::StdRng;

use super::{first_unvisited, mix_uniform, normalize, sample_index, ActionStat, Selector, MIN_PROBABILITY};

/// Exponential-weights selection over the actions of one node.
#[derive(Debug, Clone)]
pub struct Exp3 {
    lo: f64,
    hi: f64,
    learning_rate: f64,
    mixing: f64,
    store_exploration: bool,
    log_scaled: bool,
    rng: StdRng,
    last_policy: Option<Vec<f64>>,
}

impl Exp3 {
    /// Create an Exp3 selector.
    pub fn new(
        lo: f64,
        hi: f64,
        learning_rate: f64,
        mixing: f64,
        store_exploration: bool,
        rng: StdRng,
    ) -> Self {
        Self {
            lo,
            hi,
            learning_rate,
            mixing,
            store_exploration,
            log_scaled: false,
            rng,
            last_policy: None,
        }
    }

    /// Switch to the log-scaled reward domain.
    pub fn log_scaled(mut self) -> Self {
        self.log_scaled = true;
        self
    }

    /// Reward mapped into `[0, 1]`.
    pub fn scale(&self, reward: f64) -> f64 {
        if self.log_scaled {
            let shifted = (reward - self.lo).clamp(0.0, self.hi - self.lo);
            shifted.ln_1p() / (self.hi - self.lo).ln_1p()
        } else {
            normalize(reward, self.lo, self.hi)
        }
    }

    /// Current sampling policy.
    ///
    /// Exponents are taken relative to the largest one, so large estimates
    /// never overflow.
    pub fn policy(&self, stats: &[ActionStat]) -> Vec<f64> {
        let max = stats
            .iter()
            .map(|s| self.learning_rate * s.estimate)
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = stats
            .iter()
            .map(|s| (self.learning_rate * s.estimate - max).exp())
            .collect();
        let sum: f64 = weights.iter().sum();

        let mut probs: Vec<f64> = weights.iter().map(|&w| w / sum).collect();
        mix_uniform(&mut probs, self.mixing);
        probs
    }
}

impl Selector for Exp3 {
    fn select_action(&mut self, stats: &[ActionStat]) -> usize {
        if let Some(a) = first_unvisited(stats) {
            self.last_policy = None;
            return a;
        }

        let policy = self.policy(stats);
        let a = sample_index(&policy, &mut self.rng);
        self.last_policy = Some(policy);
        a
    }

    fn observe_reward(&mut self, stats: &mut [ActionStat], action: usize, reward: f64) {
        let k = stats.len() as f64;
        let p = match self.last_policy.take() {
            Some(policy) if policy.len() == stats.len() => policy[action],
            _ => 1.0 / k,
        };

        let estimate = self.scale(reward) / p.max(MIN_PROBABILITY);
        stats[action].estimate += if self.store_exploration {
            self.mixing / k * estimate
        } else {
            estimate
        };
    }
}
