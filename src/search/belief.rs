//! Determinization sampling and belief tracking.
//!
//! A decision samples one hidden assignment per iteration. Uniform sampling
//! draws among every assignment the domain reports as consistent with the
//! observer's information. Belief-weighted sampling draws from a posterior
//! built from an opponent model:
//!
//! 1. After every iteration, each opponent action taken in the simulated game
//!    is counted under every feature of the hidden assignment that iteration
//!    used (see [`Game::belief_features`]), keyed by the public context it
//!    was taken in.
//! 2. At the start of a decision, counts are discounted (bounded drift), and
//!    every candidate is scored by how often, under its features, the
//!    opponents chose the actions they were actually seen to choose.
//! 3. The posterior is mixed with a uniform floor so no candidate vanishes.

use std::hash::Hash;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::search::game::{Game, PublicDecision};
use crate::search::selector::sample_index;

/// Additive smoothing on action frequencies.
const SMOOTHING: f64 = 1.0;

/// Counts below this are dropped when discounting.
const PRUNE_BELOW: f64 = 1e-3;

/// Probability mass over the hidden assignments of one information set.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefDistribution<H> {
    candidates: Vec<H>,
    /// `None` means exactly uniform.
    weights: Option<Vec<f64>>,
}

impl<H: Clone + Eq + Hash> BeliefDistribution<H> {
    /// Uniform distribution over `candidates`.
    pub fn uniform(candidates: Vec<H>) -> Self {
        Self {
            candidates,
            weights: None,
        }
    }

    /// Distribution proportional to `weights`.
    ///
    /// Falls back to uniform when every weight is equal or none is positive.
    pub fn from_weights(candidates: Vec<H>, weights: Vec<f64>) -> Self {
        debug_assert_eq!(candidates.len(), weights.len());
        let sum: f64 = weights.iter().sum();
        let first = weights.first().copied().unwrap_or(0.0);
        if !(sum > 0.0) || weights.iter().all(|&w| w == first) {
            return Self::uniform(candidates);
        }
        Self {
            candidates,
            weights: Some(weights.iter().map(|&w| w / sum).collect()),
        }
    }

    /// Whether this distribution is exactly uniform.
    pub fn is_uniform(&self) -> bool {
        self.weights.is_none()
    }

    /// Candidates in domain order.
    pub fn candidates(&self) -> &[H] {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Probability of the candidate at `index`.
    pub fn probability_at(&self, index: usize) -> f64 {
        match &self.weights {
            Some(w) => w[index],
            None => 1.0 / self.candidates.len() as f64,
        }
    }

    /// Probability of `hidden`, zero if it is not a candidate.
    pub fn probability(&self, hidden: &H) -> f64 {
        self.candidates
            .iter()
            .position(|c| c == hidden)
            .map(|i| self.probability_at(i))
            .unwrap_or(0.0)
    }

    /// Draw a candidate.
    ///
    /// A uniform distribution draws exactly like a plain uniform index draw.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &H {
        let index = match &self.weights {
            Some(w) => sample_index(w, rng),
            None => rng.gen_range(0..self.candidates.len()),
        };
        &self.candidates[index]
    }
}

/// Draws one determinization per iteration.
#[derive(Debug, Clone)]
pub struct DeterminizationSampler<G: Game> {
    observer: usize,
    distribution: BeliefDistribution<G::Hidden>,
}

impl<G: Game> DeterminizationSampler<G> {
    /// Sample uniformly among `candidates`.
    pub fn uniform(observer: usize, candidates: Vec<G::Hidden>) -> Self {
        Self::weighted(observer, BeliefDistribution::uniform(candidates))
    }

    /// Sample from a belief distribution.
    pub fn weighted(observer: usize, distribution: BeliefDistribution<G::Hidden>) -> Self {
        Self {
            observer,
            distribution,
        }
    }

    /// The distribution being sampled.
    pub fn distribution(&self) -> &BeliefDistribution<G::Hidden> {
        &self.distribution
    }

    /// Draw a hidden assignment and build the full state it implies.
    pub fn sample<R: Rng>(&self, game: &G, state: &G::State, rng: &mut R) -> (G::Hidden, G::State) {
        let hidden = self.distribution.sample(rng).clone();
        let full = game.determinize(state, self.observer, &hidden);
        (hidden, full)
    }
}

/// Discounted action counts in one public context.
#[derive(Debug, Clone)]
struct ActionCounts<A> {
    total: f64,
    by_action: FxHashMap<A, f64>,
}

impl<A: Eq + Hash> ActionCounts<A> {
    fn new() -> Self {
        Self {
            total: 0.0,
            by_action: FxHashMap::default(),
        }
    }

    fn add(&mut self, action: A, weight: f64) {
        self.total += weight;
        *self.by_action.entry(action).or_insert(0.0) += weight;
    }

    fn scale(&mut self, factor: f64) {
        self.total *= factor;
        for v in self.by_action.values_mut() {
            *v *= factor;
        }
        self.by_action.retain(|_, v| *v >= PRUNE_BELOW);
    }

    /// Smoothed frequency of `action`.
    fn likelihood(&self, action: &A) -> f64 {
        let count = self.by_action.get(action).copied().unwrap_or(0.0);
        (count + SMOOTHING) / (self.total + 2.0 * SMOOTHING)
    }
}

/// Opponent model feeding belief-weighted determinization.
#[derive(Debug, Clone)]
pub struct BeliefTracker<G: Game> {
    counts: FxHashMap<(String, usize, String), ActionCounts<G::Action>>,
    decay: f64,
    floor: f64,
}

impl<G: Game> BeliefTracker<G> {
    /// Create a tracker with per-decision `decay` and uniform `floor`.
    pub fn new(decay: f64, floor: f64) -> Self {
        Self {
            counts: FxHashMap::default(),
            decay,
            floor,
        }
    }

    /// Count an action taken by `player` in `context` under each of `features`.
    pub fn record(&mut self, features: &[String], player: usize, context: &str, action: &G::Action) {
        for feature in features {
            self.counts
                .entry((feature.clone(), player, context.to_string()))
                .or_insert_with(ActionCounts::new)
                .add(action.clone(), 1.0);
        }
    }

    /// Discount all counts; called once per decision.
    pub fn begin_decision(&mut self) {
        let decay = self.decay;
        for counts in self.counts.values_mut() {
            counts.scale(decay);
        }
        self.counts.retain(|_, c| c.total >= PRUNE_BELOW);
    }

    /// Number of `(feature, player, context)` entries tracked.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Posterior over `candidates` given the decisions seen so far.
    ///
    /// Only decisions of players other than `observer` carry evidence.
    pub fn posterior(
        &self,
        game: &G,
        candidates: Vec<G::Hidden>,
        history: &[PublicDecision<G::Action>],
        observer: usize,
    ) -> BeliefDistribution<G::Hidden> {
        let evidence: Vec<&PublicDecision<G::Action>> =
            history.iter().filter(|d| d.player != observer).collect();
        if evidence.is_empty() || self.counts.is_empty() {
            return BeliefDistribution::uniform(candidates);
        }

        // log-likelihood of every feature seen among the candidates
        let mut scores: FxHashMap<String, f64> = FxHashMap::default();
        let features: Vec<Vec<String>> = candidates.iter().map(|h| game.belief_features(h)).collect();
        let log_likelihoods: Vec<f64> = features
            .iter()
            .map(|fs| {
                fs.iter()
                    .map(|f| *scores.entry(f.clone()).or_insert_with(|| self.score(f, &evidence)))
                    .sum()
            })
            .collect();

        let max = log_likelihoods
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let n = candidates.len() as f64;
        let raw: Vec<f64> = log_likelihoods.iter().map(|&l| (l - max).exp()).collect();
        let sum: f64 = raw.iter().sum();
        let weights = raw
            .iter()
            .map(|&w| (1.0 - self.floor) * w / sum + self.floor / n)
            .collect();

        BeliefDistribution::from_weights(candidates, weights)
    }

    /// Log-likelihood of the observed decisions under one feature.
    fn score(&self, feature: &str, evidence: &[&PublicDecision<G::Action>]) -> f64 {
        let unseen = SMOOTHING / (2.0 * SMOOTHING);
        evidence
            .iter()
            .map(|d| {
                self.counts
                    .get(&(feature.to_string(), d.player, d.context.clone()))
                    .map(|c| c.likelihood(&d.action))
                    .unwrap_or(unseen)
                    .ln()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::bidding::{Bid, HiddenBidding};
    use crate::games::kuhn::{KuhnAction, KuhnPoker};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn decision(player: usize, context: &str, action: KuhnAction) -> PublicDecision<KuhnAction> {
        PublicDecision {
            context: context.to_string(),
            player,
            action,
        }
    }

    #[test]
    fn test_uniform_belief_samples_like_uniform_draws() {
        let candidates = vec![10u8, 20, 30, 40, 50];
        let explicit = BeliefDistribution::from_weights(candidates.clone(), vec![0.2; 5]);
        assert!(explicit.is_uniform());

        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        for _ in 0..100 {
            let drawn = *explicit.sample(&mut a);
            let plain = candidates[b.gen_range(0..candidates.len())];
            assert_eq!(drawn, plain);
        }
    }

    #[test]
    fn test_weighted_sampling_follows_weights() {
        let dist = BeliefDistribution::from_weights(vec!['a', 'b', 'c'], vec![0.0, 3.0, 1.0]);
        assert!(!dist.is_uniform());
        assert_eq!(dist.probability(&'a'), 0.0);
        assert!((dist.probability(&'b') - 0.75).abs() < 1e-12);
        assert_eq!(dist.probability(&'z'), 0.0);

        let mut rng = StdRng::seed_from_u64(3);
        let mut hits = [0usize; 3];
        for _ in 0..4000 {
            match *dist.sample(&mut rng) {
                'a' => hits[0] += 1,
                'b' => hits[1] += 1,
                _ => hits[2] += 1,
            }
        }
        assert_eq!(hits[0], 0);
        assert!(hits[1] > 2 * hits[2]);
    }

    fn card(c: u8) -> Vec<String> {
        KuhnPoker.belief_features(&c)
    }

    #[test]
    fn test_posterior_without_evidence_is_uniform() {
        let game = KuhnPoker::new();
        let mut tracker: BeliefTracker<KuhnPoker> = BeliefTracker::new(0.9, 0.05);
        let history = vec![decision(0, "", KuhnAction::Bet)];
        // only the observer acted so far
        assert!(tracker.posterior(&game, vec![0, 2], &history, 0).is_uniform());

        // evidence exists but nothing was recorded yet
        assert!(tracker.posterior(&game, vec![0, 2], &history, 1).is_uniform());

        tracker.record(&card(1), 0, "", &KuhnAction::Bet);
        assert!(!tracker.is_empty());
    }

    #[test]
    fn test_posterior_favours_consistent_hidden_values() {
        let game = KuhnPoker::new();
        let mut tracker: BeliefTracker<KuhnPoker> = BeliefTracker::new(1.0, 0.0);
        // under card 2 the opponent bets, under card 0 it passes
        for _ in 0..20 {
            tracker.record(&card(2), 0, "", &KuhnAction::Bet);
            tracker.record(&card(0), 0, "", &KuhnAction::Pass);
        }
        let history = vec![decision(0, "", KuhnAction::Bet)];
        let posterior = tracker.posterior(&game, vec![0, 2], &history, 1);
        assert!(posterior.probability(&2) > 0.9);
        assert!(posterior.probability(&0) < 0.1);
    }

    #[test]
    fn test_shared_features_pool_evidence() {
        let game = HiddenBidding::new(2);
        let mut tracker: BeliefTracker<HiddenBidding> = BeliefTracker::new(1.0, 0.0);
        // hands holding card 6 were only ever seen bidding 6
        for _ in 0..10 {
            tracker.record(&game.belief_features(&vec![1, 6]), 0, "ctx", &Bid(6));
            tracker.record(&game.belief_features(&vec![1, 2]), 0, "ctx", &Bid(1));
        }
        let history = vec![PublicDecision {
            context: "ctx".to_string(),
            player: 0,
            action: Bid(6),
        }];
        // [3, 6] was never simulated but shares card 6 with the evidence
        let posterior = tracker.posterior(&game, vec![vec![3, 6], vec![2, 3]], &history, 1);
        assert!(posterior.probability(&vec![3, 6]) > 0.8);
    }

    #[test]
    fn test_floor_keeps_every_candidate_alive() {
        let game = KuhnPoker::new();
        let mut tracker: BeliefTracker<KuhnPoker> = BeliefTracker::new(1.0, 0.2);
        for _ in 0..200 {
            tracker.record(&card(2), 0, "", &KuhnAction::Bet);
            tracker.record(&card(0), 0, "", &KuhnAction::Pass);
        }
        let history = vec![decision(0, "", KuhnAction::Bet)];
        let posterior = tracker.posterior(&game, vec![0, 2], &history, 1);
        assert!(posterior.probability(&0) >= 0.1 - 1e-12);
    }

    #[test]
    fn test_decay_prunes_stale_counts() {
        let mut tracker: BeliefTracker<KuhnPoker> = BeliefTracker::new(0.01, 0.05);
        tracker.record(&card(0), 1, "b", &KuhnAction::Pass);
        assert_eq!(tracker.len(), 1);
        tracker.begin_decision();
        assert_eq!(tracker.len(), 1);
        tracker.begin_decision();
        assert!(tracker.is_empty());
    }
}
