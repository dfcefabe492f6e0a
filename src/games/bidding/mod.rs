//! Hidden-hand bidding, a small card game for end-to-end search tests.
//!
//! ## Game Rules
//!
//! - A deck holds the cards `1..=3N` for `N` rounds; each player is dealt `N`
//!   cards face down and the rest are discarded unseen.
//! - Each round a prize card from `1..=N` is revealed.
//! - The round leader (alternating, player 0 first) bids one card face up;
//!   the follower then bids one card face up.
//! - The higher bid takes the prize; equal bids leave it unclaimed.
//! - After `N` rounds the utility of player 0 is the score difference
//!   divided by the total prize value, so utilities lie in `[-1, 1]`.
//!
//! ## Hidden Information
//!
//! Bids are public once played, so the only hidden thing is which cards the
//! opponent was dealt. A determinization is a full opponent hand: the cards
//! it already bid plus a combination of the cards the observer has not seen.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::search::game::{Action, Game, GameState, InfoState, PublicDecision};

/// Default number of rounds.
pub const DEFAULT_ROUNDS: usize = 5;

/// Bid one card from the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bid(pub u8);

impl Action for Bid {
    fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// A finished round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundRecord {
    /// Prize value.
    pub prize: u8,
    /// Player who bid first.
    pub leader: usize,
    /// Bid of each player.
    pub bids: [u8; 2],
    /// Player who took the prize, `None` on a tie.
    pub winner: Option<usize>,
}

/// The round being bid on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenRound {
    /// Prize value.
    pub prize: u8,
    /// Player who bids first.
    pub leader: usize,
    /// The leader's bid, once made.
    pub leader_bid: Option<u8>,
}

/// Complete state of a bidding game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiddingState {
    /// Hand each player was dealt, sorted.
    pub dealt_hands: [Vec<u8>; 2],
    /// Cards each player still holds, sorted.
    pub hands: [Vec<u8>; 2],
    /// Prizes not yet revealed.
    pub prizes: Vec<u8>,
    /// Finished rounds, oldest first.
    pub rounds: Vec<RoundRecord>,
    /// Round in progress.
    pub current: Option<OpenRound>,
    /// Prize value collected by each player.
    pub scores: [u32; 2],
    /// Whether hands have been dealt.
    pub dealt: bool,
}

impl GameState for BiddingState {}

impl fmt::Display for BiddingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P1:{:?} P2:{:?} Round:{} Score:{}-{}",
            self.hands[0],
            self.hands[1],
            self.rounds.len() + 1,
            self.scores[0],
            self.scores[1]
        )
    }
}

/// What the acting player knows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BiddingInfoState {
    /// Acting player.
    pub player: usize,
    /// Cards the acting player holds.
    pub hand: Vec<u8>,
    /// Finished rounds.
    pub rounds: Vec<RoundRecord>,
    /// Round in progress.
    pub current: Option<OpenRound>,
}

impl InfoState for BiddingInfoState {
    fn key(&self) -> String {
        let hand: Vec<String> = self.hand.iter().map(u8::to_string).collect();
        let rounds: Vec<String> = self
            .rounds
            .iter()
            .map(|r| format!("{}:{}-{}", r.prize, r.bids[0], r.bids[1]))
            .collect();
        let current = match &self.current {
            Some(OpenRound {
                prize,
                leader_bid: Some(bid),
                ..
            }) => format!("{}:{}", prize, bid),
            Some(round) => format!("{}:_", round.prize),
            None => "-".to_string(),
        };
        format!("{}|{}|{}|{}", self.player, hand.join("."), rounds.join(","), current)
    }
}

/// The hidden-hand bidding game.
#[derive(Debug, Clone)]
pub struct HiddenBidding {
    rounds: usize,
}

impl Default for HiddenBidding {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl HiddenBidding {
    /// Create a game of `rounds` rounds.
    pub fn new(rounds: usize) -> Self {
        debug_assert!(rounds > 0 && 3 * rounds <= u8::MAX as usize);
        Self { rounds }
    }

    /// Number of rounds.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Sum of all prizes.
    pub fn total_prize(&self) -> u32 {
        (self.rounds * (self.rounds + 1) / 2) as u32
    }

    /// Every card in the deck.
    pub fn deck(&self) -> Vec<u8> {
        (1..=(3 * self.rounds) as u8).collect()
    }

    /// State right after dealing the given hands, before the first prize.
    pub fn deal_hands(&self, hands: [Vec<u8>; 2]) -> BiddingState {
        let mut hands = hands;
        for hand in hands.iter_mut() {
            hand.sort_unstable();
        }
        BiddingState {
            dealt_hands: hands.clone(),
            hands,
            prizes: (1..=self.rounds as u8).collect(),
            rounds: Vec::new(),
            current: None,
            scores: [0, 0],
            dealt: true,
        }
    }

    /// Reveal `prize` as the prize of the next round.
    pub fn reveal_prize(&self, state: &BiddingState, prize: u8) -> BiddingState {
        let mut next = state.clone();
        next.prizes.retain(|&p| p != prize);
        next.current = Some(OpenRound {
            prize,
            leader: state.rounds.len() % 2,
            leader_bid: None,
        });
        next
    }

    /// Cards `player` has already bid, in play order.
    pub fn played_cards(&self, state: &BiddingState, player: usize) -> Vec<u8> {
        let mut played: Vec<u8> = state.rounds.iter().map(|r| r.bids[player]).collect();
        if let Some(OpenRound {
            leader,
            leader_bid: Some(bid),
            ..
        }) = &state.current
        {
            if *leader == player {
                played.push(*bid);
            }
        }
        played
    }

    fn context(round: usize, open: &OpenRound, scores: [u32; 2]) -> String {
        let bid = open.leader_bid.map_or("_".to_string(), |b| b.to_string());
        format!("r{}:p{}:b{}:s{}-{}", round, open.prize, bid, scores[0], scores[1])
    }
}

/// All `k`-element combinations of `pool`, in lexicographic order.
fn combinations(pool: &[u8], k: usize) -> Vec<Vec<u8>> {
    fn extend(pool: &[u8], k: usize, start: usize, current: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        let needed = k - current.len();
        for i in start..=pool.len() - needed {
            current.push(pool[i]);
            extend(pool, k, i + 1, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    if k <= pool.len() {
        extend(pool, k, 0, &mut Vec::with_capacity(k), &mut out);
    }
    out
}

impl Game for HiddenBidding {
    type State = BiddingState;
    type Action = Bid;
    type InfoState = BiddingInfoState;
    type Hidden = Vec<u8>;

    fn initial_state(&self) -> Self::State {
        BiddingState {
            dealt_hands: [Vec::new(), Vec::new()],
            hands: [Vec::new(), Vec::new()],
            prizes: Vec::new(),
            rounds: Vec::new(),
            current: None,
            scores: [0, 0],
            dealt: false,
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.dealt && state.rounds.len() >= self.rounds
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        let diff = state.scores[0] as f64 - state.scores[1] as f64;
        let p0 = diff / self.total_prize() as f64;
        if player == 0 {
            p0
        } else {
            -p0
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_terminal(state) {
            return None;
        }
        let open = state.current.as_ref()?;
        Some(match open.leader_bid {
            None => open.leader,
            Some(_) => 1 - open.leader,
        })
    }

    fn num_players(&self) -> usize {
        2
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        match self.current_player(state) {
            Some(player) => state.hands[player].iter().map(|&c| Bid(c)).collect(),
            None => vec![],
        }
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut next = state.clone();
        let (Some(player), Some(open)) = (self.current_player(state), state.current.as_ref()) else {
            return next;
        };
        next.hands[player].retain(|&c| c != action.0);

        let Some(lead) = open.leader_bid else {
            next.current = Some(OpenRound {
                leader_bid: Some(action.0),
                ..open.clone()
            });
            return next;
        };

        let mut bids = [0u8; 2];
        bids[open.leader] = lead;
        bids[player] = action.0;
        let winner = match bids[0].cmp(&bids[1]) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        };
        if let Some(w) = winner {
            next.scores[w] += open.prize as u32;
        }
        next.rounds.push(RoundRecord {
            prize: open.prize,
            leader: open.leader,
            bids,
            winner,
        });
        next.current = None;
        next
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        let player = self.current_player(state).unwrap_or(0);
        BiddingInfoState {
            player,
            hand: state.hands[player].clone(),
            rounds: state.rounds.clone(),
            current: state.current.clone(),
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt || (state.current.is_none() && state.rounds.len() < self.rounds)
    }

    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        if !state.dealt {
            let mut deck = self.deck();
            deck.shuffle(rng);
            let n = self.rounds;
            return self.deal_hands([deck[..n].to_vec(), deck[n..2 * n].to_vec()]);
        }
        match state.prizes.choose(rng) {
            Some(&prize) => self.reveal_prize(state, prize),
            None => state.clone(),
        }
    }

    fn hidden_candidates(&self, state: &Self::State, observer: usize) -> Vec<Vec<u8>> {
        let opponent = 1 - observer;
        let revealed = self.played_cards(state, opponent);
        let pool: Vec<u8> = self
            .deck()
            .into_iter()
            .filter(|c| !state.dealt_hands[observer].contains(c) && !revealed.contains(c))
            .collect();

        let unseen = self.rounds.saturating_sub(revealed.len());
        combinations(&pool, unseen)
            .into_iter()
            .map(|mut hand| {
                hand.extend_from_slice(&revealed);
                hand.sort_unstable();
                hand
            })
            .collect()
    }

    fn determinize(&self, state: &Self::State, observer: usize, hidden: &Vec<u8>) -> Self::State {
        let opponent = 1 - observer;
        let played = self.played_cards(state, opponent);
        let mut sampled = state.clone();
        sampled.dealt_hands[opponent] = hidden.clone();
        sampled.hands[opponent] = hidden.iter().copied().filter(|c| !played.contains(c)).collect();
        sampled
    }

    fn public_key(&self, state: &Self::State) -> String {
        match &state.current {
            Some(open) => Self::context(state.rounds.len(), open, state.scores),
            None => String::new(),
        }
    }

    fn public_history(&self, state: &Self::State) -> Vec<PublicDecision<Bid>> {
        let mut decisions = Vec::new();
        let mut scores = [0u32; 2];

        for (i, record) in state.rounds.iter().enumerate() {
            let follower = 1 - record.leader;
            let mut open = OpenRound {
                prize: record.prize,
                leader: record.leader,
                leader_bid: None,
            };
            decisions.push(PublicDecision {
                context: Self::context(i, &open, scores),
                player: record.leader,
                action: Bid(record.bids[record.leader]),
            });
            open.leader_bid = Some(record.bids[record.leader]);
            decisions.push(PublicDecision {
                context: Self::context(i, &open, scores),
                player: follower,
                action: Bid(record.bids[follower]),
            });
            if let Some(w) = record.winner {
                scores[w] += record.prize as u32;
            }
        }

        if let Some(open) = &state.current {
            if let Some(bid) = open.leader_bid {
                let before = OpenRound {
                    leader_bid: None,
                    ..open.clone()
                };
                decisions.push(PublicDecision {
                    context: Self::context(state.rounds.len(), &before, scores),
                    player: open.leader,
                    action: Bid(bid),
                });
            }
        }
        decisions
    }

    fn belief_features(&self, hidden: &Vec<u8>) -> Vec<String> {
        hidden.iter().map(u8::to_string).collect()
    }

    fn action_name(&self, action: &Self::Action) -> String {
        format!("bid {}", action.0)
    }

    fn state_description(&self, state: &Self::State) -> String {
        format!("{}", state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchplay::play_match;
    use crate::search::{IsmctsSearch, SearchBudget, SearchConfig, SelectorKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_deal(game: &HiddenBidding) -> BiddingState {
        game.deal_hands([vec![1, 4, 7, 10, 13], vec![2, 5, 8, 11, 14]])
    }

    #[test]
    fn test_deal_is_a_partition_of_the_deck() {
        let game = HiddenBidding::default();
        let mut rng = StdRng::seed_from_u64(4);
        let state = game.sample_chance(&game.initial_state(), &mut rng);

        assert!(state.dealt);
        assert!(game.is_chance(&state));
        assert_eq!(state.hands[0].len(), 5);
        assert_eq!(state.hands[1].len(), 5);
        assert!(state.hands[0].iter().all(|c| !state.hands[1].contains(c)));
        assert!(state.hands.iter().flatten().all(|&c| (1..=15).contains(&c)));

        let revealed = game.sample_chance(&state, &mut rng);
        assert_eq!(game.current_player(&revealed), Some(0));
        assert_eq!(revealed.prizes.len(), 4);
    }

    #[test]
    fn test_round_resolution() {
        let game = HiddenBidding::default();
        let state = game.reveal_prize(&fixed_deal(&game), 3);

        let state = game.apply_action(&state, &Bid(7));
        assert_eq!(game.current_player(&state), Some(1));
        assert_eq!(game.played_cards(&state, 0), vec![7]);

        let state = game.apply_action(&state, &Bid(8));
        assert_eq!(state.scores, [0, 3]);
        assert_eq!(state.rounds[0].winner, Some(1));
        assert!(game.is_chance(&state));
        assert_eq!(state.hands[1], vec![2, 5, 11, 14]);

        // second round is led by player 1; a tie scores nothing
        let state = game.reveal_prize(&state, 5);
        assert_eq!(game.current_player(&state), Some(1));
        let state = game.apply_action(&state, &Bid(2));
        let state = game.apply_action(&state, &Bid(1));
        assert_eq!(state.scores, [0, 8]);
        assert!((game.get_payoff(&state, 1) - 8.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_tied_bids_leave_the_prize() {
        let game = HiddenBidding::new(1);
        let state = game.reveal_prize(&game.deal_hands([vec![2], vec![2]]), 1);
        let state = game.apply_action(&state, &Bid(2));
        let state = game.apply_action(&state, &Bid(2));
        assert!(game.is_terminal(&state));
        assert_eq!(game.payoffs(&state), vec![0.0, 0.0]);
    }

    #[test]
    fn test_candidates_are_consistent_with_observation() {
        let game = HiddenBidding::default();
        let state = game.reveal_prize(&fixed_deal(&game), 4);
        assert_eq!(game.hidden_candidates(&state, 0).len(), 252);

        let state = game.apply_action(&state, &Bid(13));
        let candidates = game.hidden_candidates(&state, 1);
        // the opponent's bid is public, four of its cards are not
        assert_eq!(candidates.len(), 126);
        let own_key = game.info_state(&state).key();
        for hand in &candidates {
            assert!(hand.contains(&13));
            assert!(hand.iter().all(|c| ![2, 5, 8, 11, 14].contains(c)));
            let sampled = game.determinize(&state, 1, hand);
            assert_eq!(game.info_state(&sampled).key(), own_key);
            assert_eq!(game.available_actions(&sampled), game.available_actions(&state));
        }
        assert!(candidates.contains(&state.dealt_hands[0]));
    }

    #[test]
    fn test_public_history_matches_public_keys() {
        let game = HiddenBidding::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut state = game.initial_state();
        let mut seen = Vec::new();

        while !game.is_terminal(&state) {
            if game.is_chance(&state) {
                state = game.sample_chance(&state, &mut rng);
                continue;
            }
            let actions = game.available_actions(&state);
            let action = actions[rng.gen_range(0..actions.len())];
            let player = game.current_player(&state).unwrap();
            seen.push(PublicDecision {
                context: game.public_key(&state),
                player,
                action,
            });
            state = game.apply_action(&state, &action);
            assert_eq!(game.public_history(&state), seen);
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_search_takes_a_free_prize() {
        // the follower can win this prize cheaply and keep its high card
        let game = HiddenBidding::new(2);
        let state = game.deal_hands([vec![1, 6], vec![2, 5]]);
        let state = game.reveal_prize(&state, 2);
        let state = game.apply_action(&state, &Bid(1));

        let config = SearchConfig::default().with_selector(SelectorKind::Uct);
        let mut search = IsmctsSearch::new(game, config).unwrap();
        let result = search
            .choose_action(&state, SearchBudget::Iterations(1_000), 3)
            .unwrap();
        assert_eq!(result.action, Bid(2));
    }

    #[test]
    fn test_seeded_match_is_reproducible() {
        let game = HiddenBidding::new(5);
        let seat = SearchConfig::default().with_budget(SearchBudget::Iterations(500));
        let configs = [seat.clone(), seat];

        let first = play_match(&game, &configs, 2024).unwrap();
        let second = play_match(&game, &configs, 2024).unwrap();
        assert_eq!(first.utilities, second.utilities);
        assert_eq!(first.decisions, 10);
        assert!(first.utilities[0] >= -1.0 && first.utilities[0] <= 1.0);
    }

    #[test]
    fn test_every_selector_with_widening_and_belief_completes_a_match() {
        let game = HiddenBidding::new(3);
        for kind in SelectorKind::ALL {
            let seat = SearchConfig::cpw(1.0, 0.5)
                .with_selector(kind)
                .with_belief(true)
                .with_tree_reuse(true)
                .with_budget(SearchBudget::Iterations(150));
            let outcome = play_match(&game, &[seat.clone(), seat], 5).unwrap();
            assert_eq!(outcome.decisions, 6);
            assert_eq!(outcome.fallbacks, 0);
        }
    }

    #[test]
    fn test_larger_game_with_fixed_budget() {
        let game = HiddenBidding::new(7);
        let seat = SearchConfig::default()
            .with_selector(SelectorKind::Exp3)
            .with_budget(SearchBudget::Iterations(200));
        let outcome = play_match(&game, &[seat.clone(), seat], 77).unwrap();
        assert_eq!(outcome.decisions, 14);
        assert!((outcome.utilities[0] + outcome.utilities[1]).abs() < 1e-12);
    }
}
