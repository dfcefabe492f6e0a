//! Kuhn Poker, the smallest interesting imperfect-information game.
//!
//! Used to validate the search engine: every information set is small
//! enough to reason about by hand, and several decisions have a single
//! dominant answer that any working searcher must find.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P1 (first to act)
//! ├── Pass
//! │   └── P2
//! │       ├── Pass → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P1
//! │               ├── Pass → P2 wins (pot = 3)
//! │               └── Bet → Showdown (pot = 4)
//! └── Bet
//!     └── P2
//!         ├── Pass → P1 wins (pot = 3)
//!         └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Hidden Information
//!
//! The only thing a player cannot see is the opponent's card, so a
//! determinization is just one of the two cards the observer does not hold.
//! Payoffs lie in `[-2, 2]`; bounded selectors need those value bounds.

use rand::Rng;
use std::fmt;

use crate::search::game::{Action, Game, GameState, InfoState, PublicDecision};

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl KuhnAction {
    fn symbol(&self) -> char {
        match self {
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            'p' => Some(KuhnAction::Pass),
            'b' => Some(KuhnAction::Bet),
            _ => None,
        }
    }
}

impl Action for KuhnAction {
    fn to_string(&self) -> String {
        self.symbol().to_string()
    }
}

/// Information state in Kuhn Poker.
///
/// What a player knows: their card and the action history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KuhnInfoState {
    /// Player's card (0=Jack, 1=Queen, 2=King)
    pub card: u8,
    /// Action history as string (e.g., "pb" = pass then bet)
    pub history: String,
}

impl InfoState for KuhnInfoState {
    fn key(&self) -> String {
        format!("{}:{}", self.card, self.history)
    }
}

impl fmt::Display for KuhnInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", KuhnPoker::card_symbol(self.card), self.history)
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuhnState {
    /// Cards dealt to each player; `cards[0]` belongs to the first player.
    pub cards: [u8; 2],
    /// Action history as string
    pub history: String,
    /// Amount each player has invested in the pot
    pub pot: [i32; 2],
    /// Whether cards have been dealt (for chance node handling)
    pub dealt: bool,
}

impl GameState for KuhnState {}

impl Default for KuhnState {
    fn default() -> Self {
        Self {
            cards: [0, 0],
            history: String::new(),
            pot: [1, 1],
            dealt: false,
        }
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P1:{} P2:{} History:{} Pot:{:?}",
            KuhnPoker::card_symbol(self.cards[0]),
            KuhnPoker::card_symbol(self.cards[1]),
            self.history,
            self.pot
        )
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Default)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }

    /// Get card name for display.
    pub fn card_name(card: u8) -> &'static str {
        match card {
            0 => "Jack",
            1 => "Queen",
            2 => "King",
            _ => "Unknown",
        }
    }

    fn card_symbol(card: u8) -> &'static str {
        match card {
            0 => "J",
            1 => "Q",
            2 => "K",
            _ => "?",
        }
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoState;
    type Hidden = u8;

    fn initial_state(&self) -> Self::State {
        KuhnState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        matches!(state.history.as_str(), "pp" | "pbp" | "pbb" | "bp" | "bb")
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        debug_assert!(self.is_terminal(state), "get_payoff called on non-terminal state");

        let p0_wins = state.cards[0] > state.cards[1];
        let p0_payoff: f64 = match state.history.as_str() {
            "pp" if p0_wins => 1.0,
            "pp" => -1.0,
            "bp" => 1.0,
            "pbp" => -1.0,
            "bb" | "pbb" if p0_wins => 2.0,
            "bb" | "pbb" => -2.0,
            _ => 0.0,
        };

        if player == 0 {
            p0_payoff
        } else {
            -p0_payoff
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_chance(state) {
            return None;
        }
        match state.history.as_str() {
            "" | "pb" => Some(0),
            "p" | "b" => Some(1),
            _ => None,
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.current_player(state).is_none() {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = state.clone();
        if let (KuhnAction::Bet, Some(player)) = (action, self.current_player(state)) {
            new_state.pot[player] += 1;
        }
        new_state.history.push(action.symbol());
        new_state
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        let player = self.current_player(state).unwrap_or(0);
        KuhnInfoState {
            card: state.cards[player],
            history: state.history.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt
    }

    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        debug_assert!(self.is_chance(state), "sample_chance called on non-chance state");

        let mut cards = [0u8, 1, 2];
        for i in (1..3).rev() {
            let j = rng.gen_range(0..=i);
            cards.swap(i, j);
        }

        KuhnState {
            cards: [cards[0], cards[1]],
            dealt: true,
            ..KuhnState::default()
        }
    }

    fn hidden_candidates(&self, state: &Self::State, observer: usize) -> Vec<u8> {
        let own = state.cards[observer];
        (0..3).filter(|&card| card != own).collect()
    }

    fn determinize(&self, state: &Self::State, observer: usize, hidden: &u8) -> Self::State {
        let mut sampled = state.clone();
        sampled.cards[1 - observer] = *hidden;
        sampled
    }

    fn public_key(&self, state: &Self::State) -> String {
        state.history.clone()
    }

    fn public_history(&self, state: &Self::State) -> Vec<PublicDecision<KuhnAction>> {
        let mut replay = KuhnState {
            cards: state.cards,
            dealt: true,
            ..KuhnState::default()
        };
        let mut decisions = Vec::new();
        for action in state.history.chars().filter_map(KuhnAction::from_symbol) {
            let Some(player) = self.current_player(&replay) else {
                break;
            };
            decisions.push(PublicDecision {
                context: replay.history.clone(),
                player,
                action,
            });
            replay = self.apply_action(&replay, &action);
        }
        decisions
    }

    fn action_name(&self, action: &Self::Action) -> String {
        match action {
            KuhnAction::Pass => "Pass".to_string(),
            KuhnAction::Bet => "Bet".to_string(),
        }
    }

    fn state_description(&self, state: &Self::State) -> String {
        format!("{}", state)
    }
}
