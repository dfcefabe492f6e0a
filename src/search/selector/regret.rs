//! Regret matching used as a bandit heuristic.
//!
//! The sampling policy is proportional to the positive part of each action's
//! cumulative regret, uniform when no regret is positive, and mixed with a
//! little uniform exploration so every probability stays above zero.
//!
//! After an action `a` played with probability `p(a)` returns reward `r`
//! (clipped into the value bounds and rescaled to `[0, 1]`), every action `b`
//! receives
//!
//! ```text
//! regret(b) += u(b) - r,   u(a) = r / p(a),   u(b) = 0 for b != a
//! ```
//!
//! This is a selection heuristic only. Nothing here claims convergence to an
//! equilibrium.

use rand::rngs::StdRng;

use super::{first_unvisited, mix_uniform, normalize, sample_index, ActionStat, Selector, MIN_PROBABILITY};

/// Regret-matching selection over the actions of one node.
#[derive(Debug, Clone)]
pub struct RegretMatching {
    lo: f64,
    hi: f64,
    mixing: f64,
    rng: StdRng,
    /// Policy the last selection was drawn from; `None` after a forced
    /// exploration of an unvisited action.
    last_policy: Option<Vec<f64>>,
}

impl RegretMatching {
    /// Create a regret-matching selector.
    pub fn new(lo: f64, hi: f64, mixing: f64, rng: StdRng) -> Self {
        Self {
            lo,
            hi,
            mixing,
            rng,
            last_policy: None,
        }
    }

    /// Current sampling policy.
    pub fn policy(&self, stats: &[ActionStat]) -> Vec<f64> {
        let positive: Vec<f64> = stats.iter().map(|s| s.regret.max(0.0)).collect();
        let sum: f64 = positive.iter().sum();

        let mut probs = if sum > 0.0 {
            positive.iter().map(|&x| x / sum).collect()
        } else {
            vec![1.0 / stats.len() as f64; stats.len()]
        };
        mix_uniform(&mut probs, self.mixing);
        probs
    }
}

impl Selector for RegretMatching {
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
        let r = normalize(reward, self.lo, self.hi);
        let p = match self.last_policy.take() {
            Some(policy) if policy.len() == stats.len() => policy[action],
            // forced exploration: weigh as if drawn uniformly
            _ => 1.0 / stats.len() as f64,
        };

        for (b, stat) in stats.iter_mut().enumerate() {
            let estimate = if b == action { r / p.max(MIN_PROBABILITY) } else { 0.0 };
            stat.regret += estimate - r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::selector::tests::visited;
    use rand::SeedableRng;

    fn rm() -> RegretMatching {
        RegretMatching::new(-1.0, 1.0, 0.0, StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_policy_proportional_to_positive_regret() {
        let selector = rm();
        let mut stats = vec![visited(3, 0.0), visited(3, 0.0), visited(3, 0.0)];
        stats[0].regret = 3.0;
        stats[1].regret = -5.0;
        stats[2].regret = 1.0;
        let policy = selector.policy(&stats);
        assert!((policy[0] - 0.75).abs() < 1e-12);
        assert_eq!(policy[1], 0.0);
        assert!((policy[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_when_no_positive_regret() {
        let selector = rm();
        let mut stats = vec![visited(3, 0.0), visited(3, 0.0)];
        stats[0].regret = -1.0;
        stats[1].regret = 0.0;
        assert_eq!(selector.policy(&stats), vec![0.5, 0.5]);
    }

    #[test]
    fn test_only_positive_regret_actions_are_sampled() {
        let mut selector = rm();
        let mut stats = vec![visited(3, 0.0), visited(3, 0.0), visited(3, 0.0)];
        stats[1].regret = 2.0;
        for _ in 0..50 {
            assert_eq!(selector.select_action(&stats), 1);
        }
    }

    #[test]
    fn test_regret_update_clips_rewards() {
        let mut selector = rm();
        let mut stats = vec![visited(1, 0.0), visited(1, 0.0)];
        // forced exploration path: p = 1/2, reward 7 clips to 1
        selector.observe_reward(&mut stats, 0, 7.0);
        assert!((stats[0].regret - 1.0).abs() < 1e-12);
        assert!((stats[1].regret + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_probability_draw_keeps_regrets_finite() {
        let mut selector = rm();
        let mut stats = vec![visited(3, 0.0), visited(3, 0.0)];
        selector.last_policy = Some(vec![1.0, 0.0]);
        selector.observe_reward(&mut stats, 1, 1.0);
        assert!(stats.iter().all(|s| s.regret.is_finite()));
        assert!(selector.policy(&stats).iter().all(|p| p.is_finite()));
    }
}
