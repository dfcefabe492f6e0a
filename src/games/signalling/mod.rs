//! Costly signalling, a repeated sender/receiver game.
//!
//! Small enough for fast series, and built so that the sender's actions say
//! something about what the receiver cannot see. That makes it the natural
//! end-to-end check for belief-weighted determinization.
//!
//! ## Game Rules
//!
//! - Before play, chance deals the sender one hidden type (0 or 1) per round.
//! - Each round the sender shows a signal (0 or 1), then the receiver guesses
//!   the sender's type for that round. The type is revealed after the guess.
//! - A correct guess earns the receiver 1 from the sender, a wrong one costs
//!   the receiver 1.
//! - A signal equal to the type earns the sender an honesty bonus on top.
//!
//! The bonus defaults to 3, which is more than a caught signal can cost, so
//! honest signals dominate. Utilities are zero-sum and scaled by
//! `rounds * (1 + honesty)` into `[-1, 1]`.
//!
//! ## Hidden Information
//!
//! The receiver never sees the types of rounds still to be guessed; a
//! determinization is a full type sequence agreeing with the revealed ones.
//! The sender sees everything.

use rand::Rng;
use std::fmt;

use crate::search::game::{Action, Game, GameState, InfoState, PublicDecision};

/// Seat that signals.
pub const SENDER: usize = 0;

/// Seat that guesses.
pub const RECEIVER: usize = 1;

/// Default number of rounds.
pub const DEFAULT_ROUNDS: usize = 4;

/// Default honesty bonus.
pub const DEFAULT_HONESTY: f64 = 3.0;

/// A move in the signalling game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Play {
    /// The sender shows a signal.
    Signal(u8),
    /// The receiver names a type.
    Guess(u8),
}

impl Action for Play {
    fn to_string(&self) -> String {
        match self {
            Play::Signal(s) => format!("s{}", s),
            Play::Guess(g) => format!("g{}", g),
        }
    }
}

/// Complete state of a signalling game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignallingState {
    /// Sender type of every round.
    pub types: Vec<u8>,
    /// Signals shown so far.
    pub signals: Vec<u8>,
    /// Guesses made so far.
    pub guesses: Vec<u8>,
    /// Whether types have been dealt.
    pub dealt: bool,
}

impl GameState for SignallingState {}

impl SignallingState {
    /// Types already revealed to the receiver.
    pub fn revealed(&self) -> &[u8] {
        &self.types[..self.guesses.len().min(self.types.len())]
    }
}

impl fmt::Display for SignallingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "types:{} signals:{} guesses:{}",
            digits(&self.types),
            digits(&self.signals),
            digits(&self.guesses)
        )
    }
}

/// What the acting player knows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignallingInfoState {
    /// Acting player.
    pub player: usize,
    /// Types visible to the acting player.
    pub types: Vec<u8>,
    /// Signals shown so far.
    pub signals: Vec<u8>,
    /// Guesses made so far.
    pub guesses: Vec<u8>,
}

impl InfoState for SignallingInfoState {
    fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.player,
            digits(&self.types),
            digits(&self.signals),
            digits(&self.guesses)
        )
    }
}

fn digits(values: &[u8]) -> String {
    values.iter().map(u8::to_string).collect()
}

/// The costly signalling game.
#[derive(Debug, Clone)]
pub struct CostlySignalling {
    rounds: usize,
    honesty: f64,
}

impl Default for CostlySignalling {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl CostlySignalling {
    /// Create a game of `rounds` rounds with the default honesty bonus.
    pub fn new(rounds: usize) -> Self {
        debug_assert!(rounds > 0 && rounds < 16);
        Self {
            rounds,
            honesty: DEFAULT_HONESTY,
        }
    }

    /// Builder method: set the honesty bonus.
    pub fn with_honesty(mut self, honesty: f64) -> Self {
        self.honesty = honesty;
        self
    }

    /// Number of rounds.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// State right after dealing `types`.
    pub fn deal(&self, types: Vec<u8>) -> SignallingState {
        debug_assert_eq!(types.len(), self.rounds);
        SignallingState {
            types,
            signals: Vec::new(),
            guesses: Vec::new(),
            dealt: true,
        }
    }

    fn context(signals: &[u8], guesses: &[u8], revealed: &[u8]) -> String {
        format!("s{}:g{}:t{}", digits(signals), digits(guesses), digits(revealed))
    }
}

impl Game for CostlySignalling {
    type State = SignallingState;
    type Action = Play;
    type InfoState = SignallingInfoState;
    type Hidden = Vec<u8>;

    fn initial_state(&self) -> Self::State {
        SignallingState {
            types: Vec::new(),
            signals: Vec::new(),
            guesses: Vec::new(),
            dealt: false,
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.dealt && state.guesses.len() >= self.rounds
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        let sender: f64 = state
            .guesses
            .iter()
            .enumerate()
            .map(|(i, &guess)| {
                let ty = state.types[i];
                let bonus = if state.signals[i] == ty { self.honesty } else { 0.0 };
                let caught = if guess == ty { -1.0 } else { 1.0 };
                bonus + caught
            })
            .sum();
        let scaled = sender / (self.rounds as f64 * (1.0 + self.honesty));
        if player == SENDER {
            scaled
        } else {
            -scaled
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if !state.dealt || self.is_terminal(state) {
            return None;
        }
        if state.signals.len() == state.guesses.len() {
            Some(SENDER)
        } else {
            Some(RECEIVER)
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        match self.current_player(state) {
            Some(SENDER) => vec![Play::Signal(0), Play::Signal(1)],
            Some(_) => vec![Play::Guess(0), Play::Guess(1)],
            None => vec![],
        }
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut next = state.clone();
        match (self.current_player(state), action) {
            (Some(SENDER), Play::Signal(s)) => next.signals.push(*s),
            (Some(RECEIVER), Play::Guess(g)) => next.guesses.push(*g),
            _ => {}
        }
        next
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        let player = self.current_player(state).unwrap_or(SENDER);
        let types = if player == SENDER {
            state.types.clone()
        } else {
            state.revealed().to_vec()
        };
        SignallingInfoState {
            player,
            types,
            signals: state.signals.clone(),
            guesses: state.guesses.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt
    }

    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        if state.dealt {
            return state.clone();
        }
        self.deal((0..self.rounds).map(|_| rng.gen_range(0..2)).collect())
    }

    fn hidden_candidates(&self, state: &Self::State, observer: usize) -> Vec<Vec<u8>> {
        if observer == SENDER {
            return vec![state.types.clone()];
        }
        let revealed = state.revealed();
        let unseen = self.rounds - revealed.len();
        (0..1u32 << unseen)
            .map(|bits| {
                let mut types = revealed.to_vec();
                types.extend((0..unseen).rev().map(|j| ((bits >> j) & 1) as u8));
                types
            })
            .collect()
    }

    fn determinize(&self, state: &Self::State, observer: usize, hidden: &Vec<u8>) -> Self::State {
        let mut sampled = state.clone();
        if observer == RECEIVER {
            sampled.types = hidden.clone();
        }
        sampled
    }

    fn public_key(&self, state: &Self::State) -> String {
        Self::context(&state.signals, &state.guesses, state.revealed())
    }

    fn public_history(&self, state: &Self::State) -> Vec<PublicDecision<Play>> {
        let mut decisions = Vec::new();
        for (i, &signal) in state.signals.iter().enumerate() {
            decisions.push(PublicDecision {
                context: Self::context(&state.signals[..i], &state.guesses[..i], &state.types[..i]),
                player: SENDER,
                action: Play::Signal(signal),
            });
            if let Some(&guess) = state.guesses.get(i) {
                decisions.push(PublicDecision {
                    context: Self::context(&state.signals[..=i], &state.guesses[..i], &state.types[..i]),
                    player: RECEIVER,
                    action: Play::Guess(guess),
                });
            }
        }
        decisions
    }

    fn belief_features(&self, hidden: &Vec<u8>) -> Vec<String> {
        hidden
            .iter()
            .enumerate()
            .map(|(round, ty)| format!("{}={}", round, ty))
            .collect()
    }

    fn state_description(&self, state: &Self::State) -> String {
        format!("{}", state)
    }
}
