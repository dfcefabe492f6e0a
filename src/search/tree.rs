//! Arena storage for the information-set search tree.
//!
//! Nodes live in one growable vector and are addressed by index. A hash map
//! from `(player, information-set key)` to index lets every determinization
//! that reaches the same information set share one node, and lets a later
//! decision find its root again when the tree is reused across turns.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::search::belief::BeliefDistribution;
use crate::search::error::SearchError;
use crate::search::game::{Action, Game};
use crate::search::selector::{ActionStat, NodeSelector, Selector};
use crate::search::widening::CpwEdge;

/// Index of a node in the arena.
pub type NodeId = usize;

/// One information set of one player.
#[derive(Debug, Clone)]
pub struct InfoSetNode<G: Game> {
    /// Key of the information set.
    pub info_key: String,
    /// Player acting at this information set.
    pub player: usize,
    /// Legal actions, in the order the domain listed them.
    pub actions: Vec<G::Action>,
    /// Statistics per action.
    pub stats: Vec<ActionStat>,
    /// Children unlocked below each action.
    pub edges: Vec<CpwEdge>,
    /// Iterations that took an action here.
    pub visits: u64,
    /// Selector owned by this node.
    pub selector: NodeSelector,
    /// Belief over hidden assignments, kept on decision roots.
    pub belief: Option<BeliefDistribution<G::Hidden>>,
}

impl<G: Game> InfoSetNode<G> {
    /// Ask the node's selector for the next action index.
    pub fn select_action(&mut self) -> usize {
        self.selector.select_action(&self.stats)
    }

    /// Whether a state of `player` offering `actions` can be routed here.
    pub fn accepts(&self, player: usize, actions: &[G::Action]) -> bool {
        self.player == player && self.actions == actions
    }

    /// Mean reward of each action, in action order.
    pub fn means(&self) -> Vec<f64> {
        self.stats.iter().map(ActionStat::mean).collect()
    }
}

/// The search tree: every node reachable during one decision (or, with tree
/// reuse, during one match).
#[derive(Debug, Clone)]
pub struct SearchTree<G: Game> {
    nodes: Vec<InfoSetNode<G>>,
    index: FxHashMap<(usize, String), NodeId>,
}

impl<G: Game> Default for SearchTree<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Game> SearchTree<G> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Node holding `player`'s information set `info_key`, if any.
    pub fn lookup(&self, player: usize, info_key: &str) -> Option<NodeId> {
        self.index.get(&(player, info_key.to_string())).copied()
    }

    /// Add a node for an information set seen for the first time.
    pub fn insert(
        &mut self,
        player: usize,
        info_key: String,
        actions: Vec<G::Action>,
        selector: NodeSelector,
    ) -> NodeId {
        let id = self.nodes.len();
        let num_actions = actions.len();
        self.index.insert((player, info_key.clone()), id);
        self.nodes.push(InfoSetNode {
            info_key,
            player,
            actions,
            stats: vec![ActionStat::default(); num_actions],
            edges: vec![CpwEdge::default(); num_actions],
            visits: 0,
            selector,
            belief: None,
        });
        id
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &InfoSetNode<G> {
        &self.nodes[id]
    }

    /// Borrow a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> &mut InfoSetNode<G> {
        &mut self.nodes[id]
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[InfoSetNode<G>] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Verify that a state reaching node `id` offers the actions it was created with.
    pub fn check_actions(&self, id: NodeId, actions: &[G::Action]) -> Result<(), SearchError> {
        let node = &self.nodes[id];
        if node.actions == actions {
            return Ok(());
        }
        Err(SearchError::InconsistentActions {
            info_key: node.info_key.clone(),
            expected: node.actions.iter().map(Action::to_string).collect(),
            found: actions.iter().map(Action::to_string).collect(),
        })
    }

    /// Unlock `child` below action `action` of `parent`.
    pub fn link(&mut self, parent: NodeId, action: usize, child: NodeId) {
        self.nodes[parent].edges[action].unlock(child);
    }

    /// Backpropagate one reward into one node.
    pub fn record(&mut self, id: NodeId, action: usize, reward: f64) {
        let node = &mut self.nodes[id];
        node.selector.observe_reward(&mut node.stats, action, reward);
        node.visits += 1;
        node.stats[action].visits += 1;
        node.stats[action].total_value += reward;
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Serializable snapshot of the tree statistics.
    pub fn export(&self) -> TreeExport {
        TreeExport {
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeExport {
                    player: node.player,
                    info_key: node.info_key.clone(),
                    visits: node.visits,
                    actions: node.actions.iter().map(Action::to_string).collect(),
                    stats: node.stats.clone(),
                    children: node.edges.iter().map(|e| e.children().to_vec()).collect(),
                })
                .collect(),
        }
    }
}

/// Serializable export of a search tree, for inspection and comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeExport {
    /// Nodes in creation order; child ids index into this vector.
    pub nodes: Vec<NodeExport>,
}

/// Serializable export of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Acting player.
    pub player: usize,
    /// Information-set key.
    pub info_key: String,
    /// Iterations that took an action here.
    pub visits: u64,
    /// Action names.
    pub actions: Vec<String>,
    /// Statistics per action.
    pub stats: Vec<ActionStat>,
    /// Unlocked children per action.
    pub children: Vec<Vec<NodeId>>,
}
