//! UCT: upper confidence bounds applied to trees.
//!
//! ```text
//! score(a) = mean(a) + c * sqrt(ln(N) / n(a))
//! ```
//!
//! Means are rescaled into `[0, 1]` with the configured value bounds, so the
//! exploration constant does not depend on the utility scale of the game.
//! Ties go to the lowest action index; UCT never draws random numbers.

use super::{first_unvisited, ActionStat, Selector};

/// UCB1 selection over the actions of one node.
#[derive(Debug, Clone)]
pub struct Uct {
    exploration: f64,
    lo: f64,
    hi: f64,
}

impl Uct {
    /// Create a UCT selector with exploration constant `c` and value bounds.
    pub fn new(exploration: f64, lo: f64, hi: f64) -> Self {
        Self { exploration, lo, hi }
    }

    /// UCB score of one visited action given the node's total visits.
    pub fn score(&self, stat: &ActionStat, total_visits: u64) -> f64 {
        let mean = (stat.mean() - self.lo) / (self.hi - self.lo);
        let bonus = ((total_visits as f64).ln() / stat.visits as f64).sqrt();
        mean + self.exploration * bonus
    }
}

impl Selector for Uct {
    fn select_action(&mut self, stats: &[ActionStat]) -> usize {
        if let Some(a) = first_unvisited(stats) {
            return a;
        }

        let total: u64 = stats.iter().map(|s| s.visits).sum();
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (a, stat) in stats.iter().enumerate() {
            let score = self.score(stat, total);
            if score > best_score {
                best = a;
                best_score = score;
            }
        }
        best
    }

    fn observe_reward(&mut self, _stats: &mut [ActionStat], _action: usize, _reward: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::selector::tests::visited;

    #[test]
    fn test_greedy_without_exploration() {
        let mut uct = Uct::new(0.0, -1.0, 1.0);
        let stats = vec![visited(10, 0.1), visited(10, 0.7), visited(10, -0.3)];
        assert_eq!(uct.select_action(&stats), 1);
    }

    #[test]
    fn test_exploration_bonus_favours_rare_actions() {
        let mut uct = Uct::new(2.0, -1.0, 1.0);
        // action 0 slightly better but heavily sampled
        let stats = vec![visited(1000, 0.2), visited(2, 0.1)];
        assert_eq!(uct.select_action(&stats), 1);
    }

    #[test]
    fn test_ties_break_to_lowest_index() {
        let mut uct = Uct::new(0.7, -1.0, 1.0);
        let stats = vec![visited(4, 0.5), visited(4, 0.5), visited(4, 0.5)];
        assert_eq!(uct.select_action(&stats), 0);
    }

    #[test]
    fn test_score_is_scale_free() {
        let small = Uct::new(1.0, -1.0, 1.0);
        let large = Uct::new(1.0, -100.0, 100.0);
        let s = small.score(&visited(4, 0.5), 16);
        let l = large.score(&visited(4, 50.0), 16);
        assert!((s - l).abs() < 1e-12);
    }
}
