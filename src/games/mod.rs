//! Game implementations for the IS-MCTS engine.
//!
//! These serve as:
//!
//! 1. **Validation**: small games where the right decision is known by hand
//!    check that the search finds it.
//!
//! 2. **End-to-end tests**: full matches between searching seats exercise
//!    determinization, belief tracking and widening together.
//!
//! 3. **Benchmarks**: fixed decisions for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, a 3-card poker game with a chance deal
//! - [`bidding`]: hidden-hand bidding over revealed prizes
//! - [`signalling`]: repeated costly signalling, where the sender's signals
//!   reveal what the receiver cannot see
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait, including `hidden_candidates` and
//!    `determinize` for what each player cannot see
//! 4. Add tests that verify expected behavior

pub mod bidding;
pub mod kuhn;
pub mod signalling;
