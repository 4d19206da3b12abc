//! King engine: 20-game party, per-selector contract quotas, six penalty
//! contracts and four trump suits, contract-specific legality/scoring, and
//! early termination (spec §4.3).

use serde::{Deserialize, Serialize};

use crate::cards::{deal, new_shuffled_deck, trick_winner, Card, Rank, Suit};
use crate::engines::error::DomainError;

pub type Seat = u8;

pub const PARTY_GAMES: u32 = 20;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Dealing,
    Selecting,
    Playing,
    GameEnd,
    PartyEnd,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyName {
    El,
    Kupa,
    Erkek,
    Kiz,
    Rifki,
    SonIki,
}

impl PenaltyName {
    pub const ALL: [PenaltyName; 6] = [
        PenaltyName::El,
        PenaltyName::Kupa,
        PenaltyName::Erkek,
        PenaltyName::Kiz,
        PenaltyName::Rifki,
        PenaltyName::SonIki,
    ];
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Contract {
    Penalty(PenaltyName),
    Trump(Suit),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorUsage {
    pub penalties: u8,
    pub trumps: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct ContractHistoryEntry {
    pub game_number: u32,
    pub selector: Seat,
    pub contract: Contract,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrickOutcome {
    pub trick_complete: bool,
    pub trick_winner: Option<Seat>,
    pub game_complete: bool,
    pub party_complete: bool,
}

#[derive(Debug, Clone)]
pub struct KingEngine {
    pub hands: [Vec<Card>; 4],
    pub game_number: u32,
    pub phase: Phase,
    pub selector_seat: Seat,
    pub contract: Option<Contract>,
    pub current_trick: Vec<(Seat, Card)>,
    pub current_player: Seat,
    pub tricks_taken: [Vec<Card>; 4],
    pub trick_winners: Vec<Seat>,
    pub tricks_played: u8,
    pub hearts_broken: bool,
    pub trump_broken: bool,
    pub per_selector_usage: [SelectorUsage; 4],
    pub global_contract_usage: std::collections::HashMap<Contract, u8>,
    pub contract_history: Vec<ContractHistoryEntry>,
    pub game_scores: [i32; 4],
    pub cumulative_scores: [i32; 4],
}

impl KingEngine {
    pub fn new(initial_selector: Seat) -> Self {
        let mut engine = KingEngine {
            hands: Default::default(),
            game_number: 0,
            phase: Phase::Dealing,
            selector_seat: initial_selector,
            contract: None,
            current_trick: Vec::new(),
            current_player: initial_selector,
            tricks_taken: Default::default(),
            trick_winners: Vec::new(),
            tricks_played: 0,
            hearts_broken: false,
            trump_broken: false,
            per_selector_usage: Default::default(),
            global_contract_usage: std::collections::HashMap::new(),
            contract_history: Vec::new(),
            game_scores: [0; 4],
            cumulative_scores: [0; 4],
        };
        engine.start_game(1, initial_selector);
        engine
    }

    pub fn start_game(&mut self, game_number: u32, selector: Seat) {
        let deck = new_shuffled_deck();
        self.hands = deal(&deck, 13);
        self.game_number = game_number;
        self.selector_seat = selector;
        self.contract = None;
        self.current_trick.clear();
        self.current_player = selector;
        self.tricks_taken = Default::default();
        self.trick_winners.clear();
        self.tricks_played = 0;
        self.hearts_broken = false;
        self.trump_broken = false;
        self.game_scores = [0; 4];
        self.phase = Phase::Selecting;
    }

    pub fn start_next_game(&mut self) -> Result<(), DomainError> {
        if self.phase != Phase::GameEnd {
            return Err(DomainError::PhaseError);
        }
        if self.game_number >= PARTY_GAMES {
            return Err(DomainError::PhaseError);
        }
        let next_selector = (self.selector_seat + 3) % 4;
        self.start_game(self.game_number + 1, next_selector);
        Ok(())
    }

    fn global_usage(&self, contract: Contract) -> u8 {
        *self.global_contract_usage.get(&contract).unwrap_or(&0)
    }

    pub fn available_penalties(&self, seat: Seat) -> Vec<PenaltyName> {
        if self.per_selector_usage[seat as usize].penalties >= 3 {
            return Vec::new();
        }
        PenaltyName::ALL
            .iter()
            .copied()
            .filter(|&n| self.global_usage(Contract::Penalty(n)) < 2)
            .collect()
    }

    pub fn available_trumps(&self, seat: Seat) -> Vec<Suit> {
        if self.per_selector_usage[seat as usize].trumps >= 2 {
            return Vec::new();
        }
        Suit::ALL
            .iter()
            .copied()
            .filter(|&s| self.global_usage(Contract::Trump(s)) < 2)
            .collect()
    }

    pub fn select_contract(&mut self, seat: Seat, contract: Contract) -> Result<(), DomainError> {
        if self.phase != Phase::Selecting {
            return Err(DomainError::PhaseError);
        }
        if seat != self.selector_seat {
            return Err(DomainError::NotYourTurn);
        }
        let usage = self.per_selector_usage[seat as usize];
        match contract {
            Contract::Penalty(_) => {
                if usage.penalties >= 3 || self.global_usage(contract) >= 2 {
                    return Err(DomainError::QuotaExhausted);
                }
            }
            Contract::Trump(_) => {
                if usage.trumps >= 2 || self.global_usage(contract) >= 2 {
                    return Err(DomainError::QuotaExhausted);
                }
            }
        }

        match contract {
            Contract::Penalty(_) => self.per_selector_usage[seat as usize].penalties += 1,
            Contract::Trump(_) => self.per_selector_usage[seat as usize].trumps += 1,
        }
        *self.global_contract_usage.entry(contract).or_insert(0) += 1;
        self.contract_history.push(ContractHistoryEntry {
            game_number: self.game_number,
            selector: seat,
            contract,
        });
        self.contract = Some(contract);
        self.phase = Phase::Playing;
        self.current_player = seat;
        Ok(())
    }

    pub fn legal_plays(&self, seat: Seat) -> Vec<Card> {
        if self.phase != Phase::Playing || self.current_player != seat {
            return Vec::new();
        }
        let Some(contract) = self.contract else {
            return Vec::new();
        };
        let hand = &self.hands[seat as usize];
        let leading = self.current_trick.is_empty();

        if leading {
            return self.legal_leads(hand, contract);
        }

        let led_suit = self.current_trick[0].1.suit;
        let following: Vec<Card> = hand.iter().copied().filter(|c| c.suit == led_suit).collect();
        if !following.is_empty() {
            if let Some(forced) = self.forced_follow(&following, led_suit, contract) {
                return forced;
            }
            return following;
        }
        self.legal_void(hand, contract)
    }

    fn legal_leads(&self, hand: &[Card], contract: Contract) -> Vec<Card> {
        match contract {
            Contract::Trump(trump_suit) => {
                let non_trump: Vec<Card> = hand.iter().copied().filter(|c| c.suit != trump_suit).collect();
                if !self.trump_broken && !non_trump.is_empty() {
                    return non_trump;
                }
                hand.to_vec()
            }
            Contract::Penalty(PenaltyName::Kupa) | Contract::Penalty(PenaltyName::Rifki) => {
                let non_hearts: Vec<Card> = hand.iter().copied().filter(|c| c.suit != Suit::Hearts).collect();
                if !self.hearts_broken && !non_hearts.is_empty() {
                    return non_hearts;
                }
                hand.to_vec()
            }
            _ => hand.to_vec(),
        }
    }

    fn forced_follow(&self, following: &[Card], led_suit: Suit, contract: Contract) -> Option<Vec<Card>> {
        let current_high = self
            .current_trick
            .iter()
            .filter(|(_, c)| c.suit == led_suit)
            .map(|(_, c)| c.rank)
            .max()?;
        match contract {
            Contract::Penalty(PenaltyName::Erkek) => {
                let forced: Vec<Card> = following
                    .iter()
                    .copied()
                    .filter(|c| matches!(c.rank, Rank::King | Rank::Jack) && c.rank < current_high)
                    .collect();
                (!forced.is_empty()).then_some(forced)
            }
            Contract::Penalty(PenaltyName::Kiz) => {
                let forced: Vec<Card> = following
                    .iter()
                    .copied()
                    .filter(|c| c.rank == Rank::Queen && c.rank < current_high)
                    .collect();
                (!forced.is_empty()).then_some(forced)
            }
            _ => None,
        }
    }

    fn legal_void(&self, hand: &[Card], contract: Contract) -> Vec<Card> {
        match contract {
            Contract::Penalty(PenaltyName::Erkek) => {
                let kj: Vec<Card> = hand.iter().copied().filter(|c| matches!(c.rank, Rank::King | Rank::Jack)).collect();
                if !kj.is_empty() {
                    return kj;
                }
            }
            Contract::Penalty(PenaltyName::Kiz) => {
                let qs: Vec<Card> = hand.iter().copied().filter(|c| c.rank == Rank::Queen).collect();
                if !qs.is_empty() {
                    return qs;
                }
            }
            Contract::Penalty(PenaltyName::Rifki) => {
                let king_hearts = Card::new(Suit::Hearts, Rank::King);
                if hand.contains(&king_hearts) {
                    return vec![king_hearts];
                }
                let hearts: Vec<Card> = hand.iter().copied().filter(|c| c.suit == Suit::Hearts).collect();
                if !hearts.is_empty() {
                    return hearts;
                }
            }
            Contract::Penalty(PenaltyName::Kupa) => {
                let hearts: Vec<Card> = hand.iter().copied().filter(|c| c.suit == Suit::Hearts).collect();
                if !hearts.is_empty() {
                    return hearts;
                }
            }
            _ => {}
        }
        hand.to_vec()
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<TrickOutcome, DomainError> {
        if self.phase != Phase::Playing {
            return Err(DomainError::PhaseError);
        }
        if self.current_player != seat {
            return Err(DomainError::NotYourTurn);
        }
        let contract = self.contract.ok_or(DomainError::PhaseError)?;
        let legal = self.legal_plays(seat);
        if !legal.contains(&card) {
            return Err(DomainError::IllegalCard);
        }
        let pos = self.hands[seat as usize]
            .iter()
            .position(|c| *c == card)
            .ok_or(DomainError::IllegalCard)?;
        self.hands[seat as usize].remove(pos);

        if card.suit == Suit::Hearts {
            self.hearts_broken = true;
        }
        if let Contract::Trump(trump_suit) = contract {
            if card.suit == trump_suit {
                self.trump_broken = true;
            }
        }
        self.current_trick.push((seat, card));

        let mut outcome = TrickOutcome::default();
        if self.current_trick.len() == 4 {
            let trump = match contract {
                Contract::Trump(s) => Some(s),
                Contract::Penalty(_) => None,
            };
            let winner = trick_winner(&self.current_trick, trump)?;
            outcome.trick_complete = true;
            outcome.trick_winner = Some(winner);
            for (_, c) in &self.current_trick {
                self.tricks_taken[winner as usize].push(*c);
            }
            self.trick_winners.push(winner);
            self.current_trick.clear();
            self.tricks_played += 1;
            self.current_player = winner;

            if self.tricks_played == 13 || self.early_termination(contract) {
                self.apply_scoring(contract);
                self.phase = Phase::GameEnd;
                outcome.game_complete = true;
                if self.game_number >= PARTY_GAMES {
                    self.phase = Phase::PartyEnd;
                    outcome.party_complete = true;
                }
            }
        } else {
            self.current_player = (self.current_player + 3) % 4;
        }
        Ok(outcome)
    }

    fn early_termination(&self, contract: Contract) -> bool {
        match contract {
            Contract::Penalty(PenaltyName::Rifki) => {
                let king_hearts = Card::new(Suit::Hearts, Rank::King);
                self.tricks_taken.iter().any(|t| t.contains(&king_hearts))
            }
            Contract::Penalty(PenaltyName::Kupa) => {
                !self.hands.iter().any(|h| h.iter().any(|c| c.suit == Suit::Hearts))
            }
            Contract::Penalty(PenaltyName::Erkek) => {
                !self.hands.iter().any(|h| h.iter().any(|c| matches!(c.rank, Rank::King | Rank::Jack)))
            }
            Contract::Penalty(PenaltyName::Kiz) => {
                !self.hands.iter().any(|h| h.iter().any(|c| c.rank == Rank::Queen))
            }
            _ => false,
        }
    }

    fn apply_scoring(&mut self, contract: Contract) {
        for seat in 0..4usize {
            let tricks = self.tricks_taken[seat].len() / 4;
            let score = match contract {
                Contract::Penalty(PenaltyName::El) => -50 * tricks as i32,
                Contract::Penalty(PenaltyName::Kupa) => {
                    let hearts = self.tricks_taken[seat].iter().filter(|c| c.suit == Suit::Hearts).count();
                    -30 * hearts as i32
                }
                Contract::Penalty(PenaltyName::Erkek) => {
                    let kj = self.tricks_taken[seat]
                        .iter()
                        .filter(|c| matches!(c.rank, Rank::King | Rank::Jack))
                        .count();
                    -60 * kj as i32
                }
                Contract::Penalty(PenaltyName::Kiz) => {
                    let queens = self.tricks_taken[seat].iter().filter(|c| c.rank == Rank::Queen).count();
                    -100 * queens as i32
                }
                Contract::Penalty(PenaltyName::Rifki) => {
                    let king_hearts = Card::new(Suit::Hearts, Rank::King);
                    if self.tricks_taken[seat].contains(&king_hearts) {
                        -320
                    } else {
                        0
                    }
                }
                Contract::Penalty(PenaltyName::SonIki) => {
                    let mut total = 0;
                    let n = self.trick_winners.len();
                    for idx in [n.wrapping_sub(2), n.wrapping_sub(1)] {
                        if idx < n && self.trick_winners[idx] as usize == seat {
                            total -= 180;
                        }
                    }
                    total
                }
                Contract::Trump(_) => 50 * tricks as i32,
            };
            self.game_scores[seat] = score;
            self.cumulative_scores[seat] += score;
        }
    }

    pub fn party_winners(&self) -> Vec<Seat> {
        let mut ranked: Vec<Seat> = (0..4)
            .filter(|&s| self.cumulative_scores[s as usize] >= 0)
            .collect();
        ranked.sort_by_key(|&s| std::cmp::Reverse(self.cumulative_scores[s as usize]));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_enforced_per_selector_and_globally() {
        let mut e = KingEngine::new(0);
        e.select_contract(0, Contract::Trump(Suit::Hearts)).unwrap();
        e.phase = Phase::GameEnd;
        e.start_game(2, 1);
        e.per_selector_usage[1].trumps = 0;
        *e.global_contract_usage.entry(Contract::Trump(Suit::Hearts)).or_insert(0) = 2;
        let err = e.select_contract(1, Contract::Trump(Suit::Hearts)).unwrap_err();
        assert_eq!(err, DomainError::QuotaExhausted);
        assert!(e.select_contract(1, Contract::Trump(Suit::Spades)).is_ok());
    }

    #[test]
    fn rifki_ends_when_king_of_hearts_captured() {
        let mut e = KingEngine::new(0);
        e.select_contract(0, Contract::Penalty(PenaltyName::Rifki)).unwrap();
        e.tricks_taken[2].push(Card::new(Suit::Hearts, Rank::King));
        assert!(e.early_termination(Contract::Penalty(PenaltyName::Rifki)));
        e.apply_scoring(Contract::Penalty(PenaltyName::Rifki));
        assert_eq!(e.game_scores[2], -320);
        assert_eq!(e.game_scores[0], 0);
    }

    #[test]
    fn sontwo_scores_last_two_tricks() {
        let mut e = KingEngine::new(0);
        e.select_contract(0, Contract::Penalty(PenaltyName::SonIki)).unwrap();
        e.trick_winners = vec![1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 1, 2];
        e.apply_scoring(Contract::Penalty(PenaltyName::SonIki));
        assert_eq!(e.game_scores[1], -180);
        assert_eq!(e.game_scores[2], -180);
        assert_eq!(e.game_scores[0], 0);
    }
}
