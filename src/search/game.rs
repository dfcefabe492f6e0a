//! Game trait definition for the IS-MCTS engine.
//!
//! Any game that implements the `Game` trait can be searched. The engine only
//! talks to the domain through this trait: legal actions, transitions,
//! information-set keys, terminal utilities and the hooks needed to sample
//! determinizations.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable for storage in maps.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Convert action to a string representation for display/export.
    fn to_string(&self) -> String;
}

/// Trait for information states (what a player knows at a decision point).
///
/// Two game states that look identical to the acting player must produce the
/// same information state, and must offer the same legal actions.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Generate a unique string key for this information state.
    /// This key is used to index nodes of the search tree.
    fn key(&self) -> String;
}

/// Trait for game states.
///
/// A game state contains all information about the current state of the game,
/// including private information that players may not see.
pub trait GameState: Clone + Debug + Send + Sync {}

/// A decision already taken in the real game, as seen by everyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicDecision<A> {
    /// Public context the decision was taken in (see [`Game::public_key`]).
    pub context: String,
    /// The player who acted.
    pub player: usize,
    /// The action taken.
    pub action: A,
}

/// The main Game trait that defines the interface for any searchable game.
///
/// # Type Parameters
/// - `State`: a complete game state, hidden parts included
/// - `Action`: an action a player can take
/// - `InfoState`: what the acting player knows
/// - `Hidden`: one assignment of the variables an observer cannot see
///
/// # Example
/// ```ignore
/// impl Game for MyGame {
///     type State = MyState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///     type Hidden = Vec<u8>;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// One assignment of everything an observer cannot see.
    type Hidden: Clone + Eq + Hash + Debug + Send + Sync;

    /// Create the initial game state (usually a chance node dealing cards).
    fn initial_state(&self) -> Self::State;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Get the payoff for a player at a terminal state.
    ///
    /// # Panics
    /// May panic if called on a non-terminal state.
    fn get_payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Utility vector for all players at a terminal state.
    fn payoffs(&self, state: &Self::State) -> Vec<f64> {
        (0..self.num_players())
            .map(|player| self.get_payoff(state, player))
            .collect()
    }

    /// Get the index of the player who should act at the current state.
    ///
    /// # Returns
    /// - `Some(player_index)` if a player should act
    /// - `None` if the state is terminal or a chance node
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize;

    /// Get the list of legal actions at the current state.
    ///
    /// Must not be empty for a non-terminal, non-chance state.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action to a state and return the resulting new state.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Get the information state of the player who is currently acting.
    fn info_state(&self, state: &Self::State) -> Self::InfoState;

    /// Check if the current state is a chance node.
    fn is_chance(&self, _state: &Self::State) -> bool {
        false
    }

    /// Sample an outcome from a chance node.
    fn sample_chance<R: rand::Rng>(&self, state: &Self::State, _rng: &mut R) -> Self::State {
        state.clone()
    }

    /// Every hidden assignment consistent with what `observer` knows in `state`.
    ///
    /// The order must be deterministic; samplers index into it.
    fn hidden_candidates(&self, state: &Self::State, observer: usize) -> Vec<Self::Hidden>;

    /// Build a full state that `observer` cannot tell apart from `state`,
    /// with the hidden parts replaced by `hidden`.
    fn determinize(&self, state: &Self::State, observer: usize, hidden: &Self::Hidden)
        -> Self::State;

    /// Public context of the decision at `state`, shared by every player.
    ///
    /// Used by belief tracking to line up simulated and observed decisions.
    /// Games without a meaningful public context keep the default.
    fn public_key(&self, _state: &Self::State) -> String {
        String::new()
    }

    /// Decisions already taken in the real game, oldest first.
    fn public_history(&self, _state: &Self::State) -> Vec<PublicDecision<Self::Action>> {
        Vec::new()
    }

    /// Features of a hidden assignment that belief tracking counts actions under.
    ///
    /// The posterior of a candidate multiplies the action likelihoods of each
    /// of its features. The default treats the whole assignment as one
    /// feature; games whose assignments share parts (cards in a hand, one
    /// type per round) should list the parts so evidence pools across
    /// candidates.
    fn belief_features(&self, hidden: &Self::Hidden) -> Vec<String> {
        vec![format!("{:?}", hidden)]
    }

    /// Get a human-readable name for an action.
    fn action_name(&self, action: &Self::Action) -> String {
        action.to_string()
    }

    /// Get a human-readable description of a state.
    fn state_description(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}

/// Macro to simplify implementing the Action trait for simple enums.
#[macro_export]
macro_rules! impl_action {
    ($type:ty) => {
        impl $crate::search::game::Action for $type {
            fn to_string(&self) -> String {
                format!("{:?}", self)
            }
        }
    };
}

/// Macro to simplify implementing the GameState trait.
#[macro_export]
macro_rules! impl_game_state {
    ($type:ty) => {
        impl $crate::search::game::GameState for $type {}
    };
}
