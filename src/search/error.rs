//! Errors raised while a decision is being searched.
//!
//! Every variant is fatal for the decision call that raised it: the engine
//! discards its tree before returning so that a half-updated tree is never
//! searched again.

use thiserror::Error;

/// Errors that abort a decision call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A non-terminal, non-chance state has nobody to act.
    #[error("no acting player in non-terminal state {state}")]
    NoActingPlayer {
        /// Description of the offending state.
        state: String,
    },

    /// The domain returned no legal actions for a non-terminal state.
    #[error("no legal actions at non-terminal information set {info_key}")]
    NoLegalActions {
        /// Information-set key of the offending state.
        info_key: String,
    },

    /// Two states sharing an information set offered different actions.
    #[error("information set {info_key} offered actions {found:?}, previously {expected:?}")]
    InconsistentActions {
        /// Information-set key shared by both states.
        info_key: String,
        /// Actions recorded when the node was created.
        expected: Vec<String>,
        /// Actions offered now.
        found: Vec<String>,
    },

    /// A terminal utility fell outside the configured value bounds of a
    /// selector that needs bounded rewards.
    #[error("reward {reward} outside value bounds [{lo}, {hi}]")]
    RewardOutOfBounds {
        /// Offending utility.
        reward: f64,
        /// Configured lower bound.
        lo: f64,
        /// Configured upper bound.
        hi: f64,
    },

    /// The domain reported no hidden assignment consistent with the observer.
    #[error("no determinization consistent with player {observer}'s information")]
    NoCandidates {
        /// Player whose information set was sampled.
        observer: usize,
    },
}
