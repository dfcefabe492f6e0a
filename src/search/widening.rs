//! Chance progressive widening (CPW).
//!
//! Below an edge `(node, action)` the next information set depends on hidden
//! state and chance, so an edge can lead to many distinct children. With
//! widening enabled an edge unlocks its `(k+1)`-th child only once its visit
//! count exceeds `f(k)`; until then a sample that would open a new child is
//! routed onto a random compatible existing child instead. When no existing
//! child can stand in, the sample leaves the tree and is finished by rollout.
//!
//! When the threshold never binds, routing always answers [`Route::Unlock`]
//! and draws no random numbers, so CPW search is step-for-step identical to
//! plain IS-MCTS.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::search::config::Widening;
use crate::search::tree::NodeId;

/// Children unlocked below one action of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpwEdge {
    children: Vec<NodeId>,
}

impl CpwEdge {
    /// Number of distinct children unlocked so far.
    pub fn unlocked(&self) -> usize {
        self.children.len()
    }

    /// Unlocked children in unlock order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether `id` is already an unlocked child.
    pub fn contains(&self, id: NodeId) -> bool {
        self.children.contains(&id)
    }

    /// Unlock `id` as a child of this edge.
    pub fn unlock(&mut self, id: NodeId) {
        if !self.contains(id) {
            self.children.push(id);
        }
    }
}

/// Where a sample arriving through an edge continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Continue at this node.
    Child(NodeId),
    /// The sample may open (or link) its own child.
    Unlock,
    /// The edge is full and nothing can stand in; stop descending.
    Rollout,
}

/// Decide where a sample arriving through `edge` continues.
///
/// * `visits` - visit count of the edge's action
/// * `target` - node already holding the sample's information set, if any
/// * `compatible` - whether an existing child can stand in for the sample
pub fn route<R, F>(
    widening: Option<&Widening>,
    edge: &CpwEdge,
    visits: u64,
    target: Option<NodeId>,
    compatible: F,
    rng: &mut R,
) -> Route
where
    R: Rng,
    F: Fn(NodeId) -> bool,
{
    if let Some(id) = target {
        if edge.contains(id) {
            return Route::Child(id);
        }
    }

    let Some(widening) = widening else {
        return Route::Unlock;
    };
    if widening.allows(visits, edge.unlocked()) {
        return Route::Unlock;
    }

    let candidates: Vec<NodeId> = edge
        .children()
        .iter()
        .copied()
        .filter(|&id| compatible(id))
        .collect();
    if candidates.is_empty() {
        return Route::Rollout;
    }
    Route::Child(candidates[rng.gen_range(0..candidates.len())])
}
