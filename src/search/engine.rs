//! Information-set Monte Carlo tree search.
//!
//! One decision runs iterations until its budget is spent. Each iteration:
//!
//! 1. samples a determinization consistent with the observer's information,
//! 2. **selects** down the tree, asking each node's selector for an action and
//!    applying it to the determinized state,
//! 3. **expands** at most one new node, the first information set reached
//!    that has no node yet,
//! 4. **simulates** to a terminal state with uniformly random legal actions,
//! 5. **backpropagates** the terminal utility of each node's own player into
//!    the action taken at that node.
//!
//! With [`Widening`](crate::search::config::Widening) configured, new children
//! below an edge are unlocked progressively (CPW-ISMCTS); see
//! [`widening`](crate::search::widening).
//!
//! All randomness of a decision comes from one generator seeded by the
//! decision call, so equal seeds give equal trees.

use std::time::Instant;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::search::belief::{BeliefTracker, DeterminizationSampler};
use crate::search::config::{ConfigError, FinalMove, SearchBudget, SearchConfig, SearchStats};
use crate::search::error::SearchError;
use crate::search::game::{Game, InfoState};
use crate::search::selector::{ActionStat, SeededSelectorFactory, SelectorFactory};
use crate::search::tree::{NodeId, SearchTree, TreeExport};
use crate::search::widening::{self, Route};

/// One step of the path an iteration took through the tree.
#[derive(Debug, Clone, Copy)]
struct PathStep {
    node: NodeId,
    action: usize,
    player: usize,
}

/// Where the selection phase continues after a decision state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Located {
    /// An existing node.
    Node(NodeId),
    /// No node yet; expand one if this iteration still may.
    Missing,
    /// Widening closed the edge; leave the tree.
    Rollout,
}

/// An opponent action seen during an iteration, for belief tracking.
#[derive(Debug, Clone)]
struct Sighting<A> {
    player: usize,
    context: String,
    action: A,
}

/// The answer to one decision call.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    /// Recommended action.
    pub action: A,
    /// Index of the action among the legal actions.
    pub action_index: usize,
    /// Iterations completed.
    pub iterations: u64,
    /// Whether the action is a uniform-random fallback (no iteration completed).
    pub fallback: bool,
    /// Visits of the root node after search.
    pub root_visits: u64,
    /// Root statistics per legal action.
    pub action_stats: Vec<(A, ActionStat)>,
}

/// The IS-MCTS engine for one player seat.
///
/// # Example
/// ```ignore
/// use ismcts_solver::search::{IsmctsSearch, SearchBudget, SearchConfig};
///
/// let mut search = IsmctsSearch::new(game, SearchConfig::default())?;
/// let result = search.choose_action(&state, SearchBudget::Iterations(500), 42)?;
/// println!("play {:?}", result.action);
/// ```
pub struct IsmctsSearch<G: Game> {
    /// The game being searched.
    game: G,

    /// Configuration for the search.
    config: SearchConfig,

    /// Builds one selector per new node.
    factory: SeededSelectorFactory,

    /// Information-set tree.
    tree: SearchTree<G>,

    /// Opponent model for belief-weighted sampling.
    belief: BeliefTracker<G>,

    /// Statistics tracking.
    stats: SearchStats,

    /// Source of per-decision seeds for [`IsmctsSearch::decide`].
    seeder: StdRng,
}

impl<G: Game> IsmctsSearch<G> {
    /// Create a searcher for the given game.
    ///
    /// Fails if the configuration is invalid.
    pub fn new(game: G, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seeder = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            game,
            factory: SeededSelectorFactory::from_config(&config),
            tree: SearchTree::new(),
            belief: BeliefTracker::new(config.belief_decay, config.belief_floor),
            stats: SearchStats::new(),
            seeder,
            config,
        })
    }

    /// Choose an action for the player acting in `state`, using the
    /// configured budget and a seed drawn from this searcher's seed sequence.
    pub fn decide(&mut self, state: &G::State) -> Result<SearchResult<G::Action>, SearchError> {
        let seed = self.seeder.gen();
        self.choose_action(state, self.config.budget, seed)
    }

    /// Choose an action for the player acting in `state`.
    ///
    /// Only what the acting player can see in `state` is used: the hidden
    /// parts are resampled every iteration. A budget too small for a single
    /// iteration yields a uniformly random legal action.
    pub fn choose_action(
        &mut self,
        state: &G::State,
        budget: SearchBudget,
        seed: u64,
    ) -> Result<SearchResult<G::Action>, SearchError> {
        let result = self.search(state, budget, seed);
        if result.is_err() {
            self.tree.clear();
        }
        result
    }

    fn search(
        &mut self,
        state: &G::State,
        budget: SearchBudget,
        seed: u64,
    ) -> Result<SearchResult<G::Action>, SearchError> {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(seed);

        let observer = self.game.current_player(state).ok_or_else(|| SearchError::NoActingPlayer {
            state: self.game.state_description(state),
        })?;
        let root_key = self.game.info_state(state).key();
        let legal = self.game.available_actions(state);
        if legal.is_empty() {
            return Err(SearchError::NoLegalActions { info_key: root_key });
        }

        if !self.config.reuse_tree {
            self.tree.clear();
        }

        let candidates = self.game.hidden_candidates(state, observer);
        if candidates.is_empty() {
            return Err(SearchError::NoCandidates { observer });
        }
        let sampler = if self.config.use_belief {
            self.belief.begin_decision();
            let history = self.game.public_history(state);
            let posterior = self.belief.posterior(&self.game, candidates, &history, observer);
            DeterminizationSampler::weighted(observer, posterior)
        } else {
            DeterminizationSampler::uniform(observer, candidates)
        };

        let mut iterations = 0u64;
        while !exhausted(&budget, iterations, &start) {
            self.run_iteration(state, observer, &sampler, &mut rng)?;
            iterations += 1;
        }

        let root = self.tree.lookup(observer, &root_key);
        if let Some(id) = root {
            self.tree.check_actions(id, &legal)?;
        }

        let result = match root {
            Some(id) if iterations > 0 => {
                let node = self.tree.node_mut(id);
                if self.config.use_belief {
                    node.belief = Some(sampler.distribution().clone());
                }
                let index = final_move(&node.stats, self.config.final_move);
                SearchResult {
                    action: legal[index].clone(),
                    action_index: index,
                    iterations,
                    fallback: false,
                    root_visits: node.visits,
                    action_stats: legal.iter().cloned().zip(node.stats.iter().cloned()).collect(),
                }
            }
            _ => {
                let index = rng.gen_range(0..legal.len());
                warn!(
                    "no search iteration completed at {}; playing random action {}",
                    root_key,
                    self.game.action_name(&legal[index])
                );
                SearchResult {
                    action: legal[index].clone(),
                    action_index: index,
                    iterations,
                    fallback: true,
                    root_visits: 0,
                    action_stats: legal.iter().cloned().map(|a| (a, ActionStat::default())).collect(),
                }
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        self.stats.decisions += 1;
        self.stats.iterations += iterations;
        self.stats.fallbacks += result.fallback as u64;
        self.stats.nodes = self.tree.len();
        self.stats.elapsed_seconds += elapsed;
        self.stats.update_rate();

        debug!(
            "player {} at {}: {} after {} iterations ({} nodes, {:.3}s)",
            observer,
            root_key,
            self.game.action_name(&result.action),
            iterations,
            self.tree.len(),
            elapsed
        );

        Ok(result)
    }

    /// Run one select/expand/simulate/backpropagate iteration.
    fn run_iteration(
        &mut self,
        root_state: &G::State,
        observer: usize,
        sampler: &DeterminizationSampler<G>,
        rng: &mut StdRng,
    ) -> Result<(), SearchError> {
        let (hidden, mut state) = sampler.sample(&self.game, root_state, rng);
        let track = self.config.use_belief;

        let mut path: Vec<PathStep> = Vec::new();
        let mut sightings: Vec<Sighting<G::Action>> = Vec::new();
        let mut parent: Option<(NodeId, usize)> = None;
        let mut expanded = false;

        // select and expand
        loop {
            if self.game.is_terminal(&state) {
                break;
            }
            if self.game.is_chance(&state) {
                state = self.game.sample_chance(&state, rng);
                continue;
            }

            let (player, actions, key) = self.decision_point(&state)?;
            let node = match self.locate(parent, player, &key, &actions, rng)? {
                Located::Node(id) => id,
                Located::Rollout => break,
                Located::Missing if expanded => break,
                Located::Missing => {
                    expanded = true;
                    let selector = self.factory.create_selector(actions.len(), rng);
                    let id = self.tree.insert(player, key, actions.clone(), selector);
                    if let Some((p, a)) = parent {
                        self.tree.link(p, a, id);
                    }
                    trace!("expanded node {} for player {}", id, player);
                    id
                }
            };

            let index = self.tree.node_mut(node).select_action();
            if track && player != observer {
                sightings.push(Sighting {
                    player,
                    context: self.game.public_key(&state),
                    action: actions[index].clone(),
                });
            }
            path.push(PathStep {
                node,
                action: index,
                player,
            });
            state = self.game.apply_action(&state, &actions[index]);
            parent = Some((node, index));
        }

        // simulate
        while !self.game.is_terminal(&state) {
            if self.game.is_chance(&state) {
                state = self.game.sample_chance(&state, rng);
                continue;
            }
            let (player, actions, _) = self.decision_point(&state)?;
            let action = actions[rng.gen_range(0..actions.len())].clone();
            if track && player != observer {
                sightings.push(Sighting {
                    player,
                    context: self.game.public_key(&state),
                    action: action.clone(),
                });
            }
            state = self.game.apply_action(&state, &action);
        }

        // backpropagate
        let utilities = self.game.payoffs(&state);
        if self.config.selector.requires_bounded_rewards() {
            let (lo, hi) = self.config.value_bounds;
            for step in &path {
                let reward = utilities[step.player];
                if !(lo..=hi).contains(&reward) {
                    return Err(SearchError::RewardOutOfBounds { reward, lo, hi });
                }
            }
        }
        for step in &path {
            self.tree.record(step.node, step.action, utilities[step.player]);
        }
        if !sightings.is_empty() {
            let features = self.game.belief_features(&hidden);
            for s in &sightings {
                self.belief.record(&features, s.player, &s.context, &s.action);
            }
        }

        Ok(())
    }

    /// Acting player, legal actions and information-set key of a decision state.
    fn decision_point(&self, state: &G::State) -> Result<(usize, Vec<G::Action>, String), SearchError> {
        let player = self.game.current_player(state).ok_or_else(|| SearchError::NoActingPlayer {
            state: self.game.state_description(state),
        })?;
        let key = self.game.info_state(state).key();
        let actions = self.game.available_actions(state);
        if actions.is_empty() {
            return Err(SearchError::NoLegalActions { info_key: key });
        }
        Ok((player, actions, key))
    }

    /// Find the node a sample continues at.
    fn locate(
        &mut self,
        parent: Option<(NodeId, usize)>,
        player: usize,
        key: &str,
        actions: &[G::Action],
        rng: &mut StdRng,
    ) -> Result<Located, SearchError> {
        let existing = self.tree.lookup(player, key);
        if let Some(id) = existing {
            self.tree.check_actions(id, actions)?;
        }
        let Some((p, a)) = parent else {
            return Ok(existing.map_or(Located::Missing, Located::Node));
        };

        let tree = &self.tree;
        let edge_node = tree.node(p);
        let route = widening::route(
            self.config.widening.as_ref(),
            &edge_node.edges[a],
            edge_node.stats[a].visits,
            existing,
            |id| tree.node(id).accepts(player, actions),
            rng,
        );

        match route {
            Route::Child(id) => {
                if existing != Some(id) {
                    trace!("widening routed {} onto node {}", key, id);
                }
                Ok(Located::Node(id))
            }
            Route::Unlock => match existing {
                Some(id) => {
                    self.tree.link(p, a, id);
                    Ok(Located::Node(id))
                }
                None => Ok(Located::Missing),
            },
            Route::Rollout => {
                trace!("widening closed the edge above {}", key);
                Ok(Located::Rollout)
            }
        }
    }

    /// Get reference to the tree.
    pub fn tree(&self) -> &SearchTree<G> {
        &self.tree
    }

    /// Serializable snapshot of the tree.
    pub fn export_tree(&self) -> TreeExport {
        self.tree.export()
    }

    /// Get reference to the belief tracker.
    pub fn belief(&self) -> &BeliefTracker<G> {
        &self.belief
    }

    /// Get current statistics.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Forget the tree, the belief model and the statistics.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.belief.clear();
        self.stats = SearchStats::new();
    }
}

/// Whether a budget is spent; checked between iterations only.
fn exhausted(budget: &SearchBudget, iterations: u64, start: &Instant) -> bool {
    match budget {
        SearchBudget::Iterations(n) => iterations >= *n,
        SearchBudget::Time(limit) => start.elapsed() >= *limit,
    }
}

/// Index of the recommended root action; ties go to the lowest index.
fn final_move(stats: &[ActionStat], policy: FinalMove) -> usize {
    let mut best = 0;
    for (a, stat) in stats.iter().enumerate().skip(1) {
        let better = match policy {
            FinalMove::MostVisited => stat.visits > stats[best].visits,
            FinalMove::BestMean => {
                stat.visits > 0 && (stats[best].visits == 0 || stat.mean() > stats[best].mean())
            }
        };
        if better {
            best = a;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::bidding::HiddenBidding;
    use crate::games::kuhn::{KuhnAction, KuhnPoker, KuhnState};
    use crate::search::config::{SelectorKind, Widening};
    use crate::search::game::PublicDecision;
    use std::time::Duration;

    fn kuhn_config() -> SearchConfig {
        SearchConfig::default().with_value_bounds(-2.0, 2.0)
    }

    fn dealt(cards: [u8; 2], history: &str) -> KuhnState {
        let game = KuhnPoker::new();
        let start = KuhnState {
            cards,
            dealt: true,
            ..KuhnState::default()
        };
        history.chars().fold(start, |state, c| {
            let action = if c == 'b' { KuhnAction::Bet } else { KuhnAction::Pass };
            game.apply_action(&state, &action)
        })
    }

    #[test]
    fn test_calls_with_king_and_folds_with_jack() {
        for kind in [SelectorKind::Uct, SelectorKind::Exp3] {
            let config = kuhn_config().with_selector(kind);
            let mut search = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();

            let king = search
                .choose_action(&dealt([0, 2], "b"), SearchBudget::Iterations(2_000), 1)
                .unwrap();
            assert_eq!(king.action, KuhnAction::Bet, "{} folded a king", kind);

            let jack = search
                .choose_action(&dealt([2, 0], "b"), SearchBudget::Iterations(2_000), 1)
                .unwrap();
            assert_eq!(jack.action, KuhnAction::Pass, "{} called with a jack", kind);
        }
    }

    #[test]
    fn test_visit_counts_add_up() {
        for kind in SelectorKind::ALL {
            let config = kuhn_config().with_selector(kind);
            let mut search = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();
            let result = search
                .choose_action(&dealt([1, 0], ""), SearchBudget::Iterations(500), 9)
                .unwrap();

            assert_eq!(result.iterations, 500);
            assert_eq!(result.root_visits, 500);
            for node in search.tree().nodes() {
                let sum: u64 = node.stats.iter().map(|s| s.visits).sum();
                assert_eq!(sum, node.visits, "{} miscounted {}", kind, node.info_key);
            }
        }
    }

    #[test]
    fn test_identical_seeds_give_identical_trees() {
        for kind in SelectorKind::ALL {
            let run = || {
                let config = kuhn_config().with_selector(kind);
                let mut search = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();
                let result = search
                    .choose_action(&dealt([2, 1], ""), SearchBudget::Iterations(300), 1234)
                    .unwrap();
                (result.action, search.export_tree())
            };
            let (a1, t1) = run();
            let (a2, t2) = run();
            assert_eq!(a1, a2);
            assert_eq!(t1, t2, "{} diverged under a fixed seed", kind);
        }
    }

    #[test]
    fn test_non_binding_widening_matches_plain_search() {
        let run = |widening: Option<Widening>| {
            let config = kuhn_config().with_widening(widening);
            let mut search = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();
            let result = search
                .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(400), 55)
                .unwrap();
            (result.action, search.export_tree())
        };
        assert_eq!(run(None), run(Some(Widening::new(0.0, 1.0))));
    }

    #[test]
    fn test_binding_widening_caps_children() {
        let config = kuhn_config().with_widening(Some(Widening::new(1e9, 1.0)));
        let mut search = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();
        search
            .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(400), 55)
            .unwrap();
        for node in search.tree().nodes() {
            for edge in &node.edges {
                assert!(edge.unlocked() <= 1);
            }
        }
        let root = search.tree().lookup(0, "1:").unwrap();
        assert_eq!(search.tree().node(root).visits, 400);
    }

    #[test]
    fn test_binding_widening_caps_hidden_hand_children() {
        // opponent nodes differ by dealt hand, so no existing child can stand in
        let game = HiddenBidding::new(5);
        let state = game.deal_hands([vec![1, 4, 7, 10, 13], vec![2, 5, 8, 11, 14]]);
        let state = game.reveal_prize(&state, 3);
        let budget = SearchBudget::Iterations(500);

        let mut plain = IsmctsSearch::new(game.clone(), SearchConfig::default()).unwrap();
        plain.choose_action(&state, budget, 21).unwrap();

        let mut capped = IsmctsSearch::new(game.clone(), SearchConfig::cpw(1e9, 1.0)).unwrap();
        let result = capped.choose_action(&state, budget, 21).unwrap();
        assert_eq!(result.iterations, 500);
        assert!(!result.fallback);

        for node in capped.tree().nodes() {
            for edge in &node.edges {
                assert!(edge.unlocked() <= 1);
            }
        }
        assert!(capped.tree().len() < plain.tree().len());

        let root = capped.tree().lookup(0, &game.info_state(&state).key()).unwrap();
        assert_eq!(capped.tree().node(root).visits, 500);
    }

    #[test]
    fn test_zero_budget_falls_back_to_random_action() {
        let mut search = IsmctsSearch::new(KuhnPoker::new(), kuhn_config()).unwrap();
        let result = search
            .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(0), 3)
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.iterations, 0);
        assert!(matches!(result.action, KuhnAction::Pass | KuhnAction::Bet));
        assert_eq!(search.stats().fallbacks, 1);
    }

    #[test]
    fn test_time_budget_is_honoured() {
        let mut search = IsmctsSearch::new(KuhnPoker::new(), kuhn_config()).unwrap();
        let start = Instant::now();
        let result = search
            .choose_action(&dealt([1, 2], ""), SearchBudget::Time(Duration::from_millis(30)), 3)
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(result.iterations > 0);
        assert!(!result.fallback);
    }

    #[test]
    fn test_unbounded_rewards_abort_uct_but_not_rm() {
        let uct = SearchConfig::default();
        let mut search = IsmctsSearch::new(KuhnPoker::new(), uct).unwrap();
        let err = search
            .choose_action(&dealt([1, 2], "b"), SearchBudget::Iterations(100), 3)
            .unwrap_err();
        assert!(matches!(err, SearchError::RewardOutOfBounds { .. }));
        assert!(search.tree().is_empty());

        let rm = SearchConfig::default().with_selector(SelectorKind::RegretMatching);
        let mut search = IsmctsSearch::new(KuhnPoker::new(), rm).unwrap();
        assert!(search
            .choose_action(&dealt([1, 2], "b"), SearchBudget::Iterations(100), 3)
            .is_ok());
    }

    #[test]
    fn test_decision_at_chance_or_terminal_state_fails() {
        let mut search = IsmctsSearch::new(KuhnPoker::new(), kuhn_config()).unwrap();
        let chance = KuhnPoker::new().initial_state();
        assert!(matches!(
            search.choose_action(&chance, SearchBudget::Iterations(10), 0),
            Err(SearchError::NoActingPlayer { .. })
        ));
        assert!(matches!(
            search.choose_action(&dealt([1, 2], "bb"), SearchBudget::Iterations(10), 0),
            Err(SearchError::NoActingPlayer { .. })
        ));
    }

    #[test]
    fn test_tree_reuse_keeps_nodes_between_decisions() {
        let mut fresh = IsmctsSearch::new(KuhnPoker::new(), kuhn_config()).unwrap();
        let mut reused = IsmctsSearch::new(KuhnPoker::new(), kuhn_config().with_tree_reuse(true)).unwrap();
        for search in [&mut fresh, &mut reused] {
            search
                .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(200), 1)
                .unwrap();
        }
        let first = reused.tree().len();
        for search in [&mut fresh, &mut reused] {
            search
                .choose_action(&dealt([1, 2], "pb"), SearchBudget::Iterations(200), 2)
                .unwrap();
        }
        // "1:pb" was already in the reused tree
        assert_eq!(reused.tree().len(), first);
        let root = reused.tree().lookup(0, "1:pb").unwrap();
        assert!(reused.tree().node(root).visits > 200);
        assert!(fresh.tree().len() < first);
    }

    #[test]
    fn test_decide_is_reproducible_with_seeded_config() {
        let config = kuhn_config().with_seed(17).with_budget(SearchBudget::Iterations(150));
        let mut a = IsmctsSearch::new(KuhnPoker::new(), config.clone()).unwrap();
        let mut b = IsmctsSearch::new(KuhnPoker::new(), config).unwrap();
        for history in ["", "p", "pb"] {
            let state = dealt([0, 1], history);
            assert_eq!(a.decide(&state).unwrap().action, b.decide(&state).unwrap().action);
        }
        assert_eq!(a.stats().iterations, 450);
    }

    #[test]
    fn test_final_move_policies() {
        let stats = vec![
            ActionStat { visits: 10, total_value: 1.0, ..Default::default() },
            ActionStat { visits: 30, total_value: 3.0, ..Default::default() },
            ActionStat { visits: 5, total_value: 4.0, ..Default::default() },
        ];
        assert_eq!(final_move(&stats, FinalMove::MostVisited), 1);
        assert_eq!(final_move(&stats, FinalMove::BestMean), 2);
    }

    /// Kuhn poker with deliberately broken contracts.
    #[derive(Debug, Clone)]
    struct Broken {
        inner: KuhnPoker,
        stuck: bool,
    }

    impl Game for Broken {
        type State = KuhnState;
        type Action = KuhnAction;
        type InfoState = <KuhnPoker as Game>::InfoState;
        type Hidden = u8;

        fn initial_state(&self) -> KuhnState {
            self.inner.initial_state()
        }
        fn is_terminal(&self, state: &KuhnState) -> bool {
            self.inner.is_terminal(state)
        }
        fn get_payoff(&self, state: &KuhnState, player: usize) -> f64 {
            self.inner.get_payoff(state, player) / 2.0
        }
        fn current_player(&self, state: &KuhnState) -> Option<usize> {
            self.inner.current_player(state)
        }
        fn num_players(&self) -> usize {
            2
        }
        fn available_actions(&self, state: &KuhnState) -> Vec<KuhnAction> {
            match (self.stuck, state.history.as_str(), state.cards[1]) {
                // nothing to do after a pass
                (true, "p", _) => vec![],
                // the opponent's hidden card leaks into the legal actions
                (false, "pb", 0) => vec![KuhnAction::Pass],
                _ => self.inner.available_actions(state),
            }
        }
        fn apply_action(&self, state: &KuhnState, action: &KuhnAction) -> KuhnState {
            self.inner.apply_action(state, action)
        }
        fn info_state(&self, state: &KuhnState) -> Self::InfoState {
            self.inner.info_state(state)
        }
        fn is_chance(&self, state: &KuhnState) -> bool {
            self.inner.is_chance(state)
        }
        fn sample_chance<R: Rng>(&self, state: &KuhnState, rng: &mut R) -> KuhnState {
            self.inner.sample_chance(state, rng)
        }
        fn hidden_candidates(&self, state: &KuhnState, observer: usize) -> Vec<u8> {
            self.inner.hidden_candidates(state, observer)
        }
        fn determinize(&self, state: &KuhnState, observer: usize, hidden: &u8) -> KuhnState {
            self.inner.determinize(state, observer, hidden)
        }
        fn public_history(&self, state: &KuhnState) -> Vec<PublicDecision<KuhnAction>> {
            self.inner.public_history(state)
        }
    }

    #[test]
    fn test_missing_legal_actions_abort_the_decision() {
        let game = Broken { inner: KuhnPoker::new(), stuck: true };
        let mut search = IsmctsSearch::new(game, SearchConfig::default()).unwrap();
        let err = search
            .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(100), 0)
            .unwrap_err();
        assert!(matches!(err, SearchError::NoLegalActions { .. }));
        assert!(search.tree().is_empty());
    }

    #[test]
    fn test_inconsistent_information_sets_abort_the_decision() {
        let game = Broken { inner: KuhnPoker::new(), stuck: false };
        let mut search = IsmctsSearch::new(game, SearchConfig::default()).unwrap();
        let err = search
            .choose_action(&dealt([1, 2], ""), SearchBudget::Iterations(2_000), 0)
            .unwrap_err();
        assert!(matches!(err, SearchError::InconsistentActions { .. }));
    }
}
