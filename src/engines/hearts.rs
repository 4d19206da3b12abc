//! Hearts engine: pass phase, first-trick/hearts-broken legality, scoring,
//! and moon-shot disambiguation (spec §4.2).

use crate::cards::{deal, new_shuffled_deck, trick_winner, Card, Rank, Suit};
use crate::engines::error::DomainError;

pub type Seat = u8;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Dealing,
    Passing,
    Playing,
    RoundEnd,
    GameEnd,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PassDirection {
    Left,
    Right,
    Across,
    Hold,
}

impl PassDirection {
    pub fn for_round(round_number: u32) -> PassDirection {
        match round_number % 4 {
            1 => PassDirection::Left,
            2 => PassDirection::Right,
            3 => PassDirection::Across,
            0 => PassDirection::Hold,
            _ => unreachable!(),
        }
    }

    fn offset(self) -> u8 {
        match self {
            PassDirection::Left => 1,
            PassDirection::Right => 3,
            PassDirection::Across => 2,
            PassDirection::Hold => 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrickOutcome {
    pub trick_complete: bool,
    pub trick_winner: Option<Seat>,
    pub round_complete: bool,
    pub game_complete: bool,
}

#[derive(Debug, Clone)]
pub struct HeartsEngine {
    pub hands: [Vec<Card>; 4],
    pub round_number: u32,
    pub phase: Phase,
    pub pass_direction: PassDirection,
    pub pending_passes: [Option<Vec<Card>>; 4],
    pub current_trick: Vec<(Seat, Card)>,
    pub current_player: Seat,
    pub hearts_broken: bool,
    pub tricks_taken: [Vec<Card>; 4],
    pub tricks_played: u8,
    pub last_trick: Option<Vec<(Seat, Card)>>,
    pub round_scores: [i32; 4],
    pub cumulative_scores: [i32; 4],
    pub ending_score: i32,
    pub moon_shooter: Option<Seat>,
}

fn point_value(card: Card) -> i32 {
    if card.is_queen_of_spades() {
        13
    } else if card.suit == Suit::Hearts {
        1
    } else {
        0
    }
}

fn two_of_clubs_holder(hands: &[Vec<Card>; 4]) -> Option<Seat> {
    hands.iter().position(|h| {
        h.iter()
            .any(|c| c.suit == Suit::Clubs && c.rank == Rank::Two)
    }).map(|s| s as Seat)
}

impl HeartsEngine {
    pub fn new(ending_score: i32) -> Self {
        let mut engine = HeartsEngine {
            hands: Default::default(),
            round_number: 0,
            phase: Phase::Dealing,
            pass_direction: PassDirection::Hold,
            pending_passes: Default::default(),
            current_trick: Vec::new(),
            current_player: 0,
            hearts_broken: false,
            tricks_taken: Default::default(),
            tricks_played: 0,
            last_trick: None,
            round_scores: [0; 4],
            cumulative_scores: [0; 4],
            ending_score,
            moon_shooter: None,
        };
        engine.start_round(1);
        engine
    }

    pub fn start_round(&mut self, round_number: u32) {
        let deck = new_shuffled_deck();
        self.hands = deal(&deck, 13);
        self.round_number = round_number;
        self.pass_direction = PassDirection::for_round(round_number);
        self.pending_passes = Default::default();
        self.current_trick.clear();
        self.hearts_broken = false;
        self.tricks_taken = Default::default();
        self.tricks_played = 0;
        self.last_trick = None;
        self.round_scores = [0; 4];
        self.moon_shooter = None;

        if self.pass_direction == PassDirection::Hold {
            self.phase = Phase::Playing;
            self.current_player = two_of_clubs_holder(&self.hands).unwrap_or(0);
        } else {
            self.phase = Phase::Passing;
        }
    }

    pub fn legal_passers(&self) -> Vec<Seat> {
        (0..4).filter(|&s| self.pending_passes[s as usize].is_none()).collect()
    }

    pub fn submit_pass(&mut self, seat: Seat, cards: Vec<Card>) -> Result<bool, DomainError> {
        if self.phase != Phase::Passing {
            return Err(DomainError::PhaseError);
        }
        if self.pending_passes[seat as usize].is_some() {
            return Err(DomainError::BadPass);
        }
        if cards.len() != 3 {
            return Err(DomainError::BadPass);
        }
        let mut unique = cards.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != 3 {
            return Err(DomainError::BadPass);
        }
        let hand = &self.hands[seat as usize];
        if !cards.iter().all(|c| hand.contains(c)) {
            return Err(DomainError::BadPass);
        }
        self.pending_passes[seat as usize] = Some(cards);

        if self.pending_passes.iter().all(|p| p.is_some()) {
            self.exchange_passes();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn exchange_passes(&mut self) {
        let offset = self.pass_direction.offset();
        let mut incoming: [Vec<Card>; 4] = Default::default();
        for giver in 0..4u8 {
            let cards = self.pending_passes[giver as usize].clone().unwrap_or_default();
            let receiver = ((giver as u16 + offset as u16) % 4) as usize;
            incoming[receiver].extend(cards.iter().copied());
            for c in &cards {
                if let Some(pos) = self.hands[giver as usize].iter().position(|h| h == c) {
                    self.hands[giver as usize].remove(pos);
                }
            }
        }
        for seat in 0..4 {
            self.hands[seat].extend(incoming[seat].iter().copied());
            self.hands[seat].sort();
        }
        self.pending_passes = Default::default();
        self.phase = Phase::Playing;
        self.current_player = two_of_clubs_holder(&self.hands).unwrap_or(0);
    }

    /// Auto-pass: pick 3 random (here: first-3-in-hand, deterministic)
    /// cards for a seat that missed the pass timer.
    pub fn auto_pass_cards(&self, seat: Seat) -> Vec<Card> {
        self.hands[seat as usize].iter().copied().take(3).collect()
    }

    pub fn legal_plays(&self, seat: Seat) -> Vec<Card> {
        if self.phase != Phase::Playing || self.current_player != seat {
            return Vec::new();
        }
        let hand = &self.hands[seat as usize];
        let leading = self.current_trick.is_empty();
        let first_trick = self.tricks_played == 0;

        if leading {
            if first_trick {
                let two_clubs = Card::new(Suit::Clubs, Rank::Two);
                if hand.contains(&two_clubs) {
                    return vec![two_clubs];
                }
            }
            let non_hearts: Vec<Card> = hand.iter().copied().filter(|c| c.suit != Suit::Hearts).collect();
            if !self.hearts_broken && !non_hearts.is_empty() {
                return non_hearts;
            }
            hand.clone()
        } else {
            let led_suit = self.current_trick[0].1.suit;
            let following: Vec<Card> = hand.iter().copied().filter(|c| c.suit == led_suit).collect();
            if !following.is_empty() {
                return following;
            }
            if first_trick {
                let safe: Vec<Card> = hand
                    .iter()
                    .copied()
                    .filter(|c| c.suit != Suit::Hearts && !c.is_queen_of_spades())
                    .collect();
                if !safe.is_empty() {
                    return safe;
                }
            }
            hand.clone()
        }
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<TrickOutcome, DomainError> {
        if self.phase != Phase::Playing {
            return Err(DomainError::PhaseError);
        }
        if self.current_player != seat {
            return Err(DomainError::NotYourTurn);
        }
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
        self.current_trick.push((seat, card));

        let mut outcome = TrickOutcome::default();
        if self.current_trick.len() == 4 {
            let winner = trick_winner(&self.current_trick, None)?;
            outcome.trick_complete = true;
            outcome.trick_winner = Some(winner);
            for (_, c) in &self.current_trick {
                self.tricks_taken[winner as usize].push(*c);
            }
            self.last_trick = Some(std::mem::take(&mut self.current_trick));
            self.tricks_played += 1;
            self.current_player = winner;

            if self.tricks_played == 13 {
                self.phase = Phase::RoundEnd;
                self.apply_round_scoring();
                outcome.round_complete = true;
                if self.cumulative_scores.iter().any(|&s| s >= self.ending_score) {
                    self.phase = Phase::GameEnd;
                    outcome.game_complete = true;
                }
            }
        } else {
            self.current_player = (self.current_player + 1) % 4;
        }
        Ok(outcome)
    }

    fn apply_round_scoring(&mut self) {
        let mut points = [0i32; 4];
        for seat in 0..4 {
            for c in &self.tricks_taken[seat] {
                points[seat] += point_value(*c);
            }
        }
        if let Some(shooter) = (0..4).find(|&s| points[s] == 26) {
            let mut option_a = [0i32; 4];
            let mut option_b = [0i32; 4];
            for s in 0..4 {
                if s == shooter {
                    option_a[s] = 0;
                    option_b[s] = 26;
                } else {
                    option_a[s] = 26;
                    option_b[s] = 0;
                }
            }
            let cum_a: Vec<i32> = (0..4).map(|s| self.cumulative_scores[s] + option_a[s]).collect();
            let others_min_a = (0..4).filter(|&s| s != shooter).map(|s| cum_a[s]).min().unwrap();
            let use_a = cum_a[shooter] <= others_min_a;
            self.round_scores = if use_a { option_a } else { option_b };
            self.moon_shooter = Some(shooter as Seat);
        } else {
            self.round_scores = points;
            self.moon_shooter = None;
        }
        for s in 0..4 {
            self.cumulative_scores[s] += self.round_scores[s];
        }
    }

    pub fn winners(&self) -> Vec<Seat> {
        let min = *self.cumulative_scores.iter().min().unwrap();
        (0..4).filter(|&s| self.cumulative_scores[s as usize] == min).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine_with_hold() -> HeartsEngine {
        let mut e = HeartsEngine::new(100);
        e.start_round(4);
        e
    }

    #[test]
    fn legal_lead_must_be_two_of_clubs() {
        let e = engine_with_hold();
        let seat = e.current_player;
        let legal = e.legal_plays(seat);
        assert_eq!(legal, vec![Card::new(Suit::Clubs, Rank::Two)]);
    }

    #[test]
    fn pass_direction_schedule() {
        assert_eq!(PassDirection::for_round(1), PassDirection::Left);
        assert_eq!(PassDirection::for_round(2), PassDirection::Right);
        assert_eq!(PassDirection::for_round(3), PassDirection::Across);
        assert_eq!(PassDirection::for_round(4), PassDirection::Hold);
        assert_eq!(PassDirection::for_round(5), PassDirection::Left);
    }

    #[test]
    fn moon_shot_assigns_option_a_when_better_for_shooter() {
        let mut e = HeartsEngine::new(100);
        e.cumulative_scores = [0, 0, 0, 0];
        e.tricks_taken = Default::default();
        // Seat 2 takes all hearts and the queen of spades.
        for suit in [Suit::Hearts] {
            for rank in Rank::ALL {
                e.tricks_taken[2].push(Card::new(suit, rank));
            }
        }
        e.tricks_taken[2].push(Card::new(Suit::Spades, Rank::Queen));
        e.phase = Phase::RoundEnd;
        e.apply_round_scoring();
        assert_eq!(e.moon_shooter, Some(2));
        assert_eq!(e.cumulative_scores, [26, 26, 0, 26]);
    }

    #[test]
    fn total_points_before_moon_rule_is_26() {
        let mut e = HeartsEngine::new(100);
        e.tricks_taken[0] = vec![Card::new(Suit::Hearts, Rank::Two)];
        e.tricks_taken[1] = vec![Card::new(Suit::Spades, Rank::Queen)];
        e.phase = Phase::RoundEnd;
        e.apply_round_scoring();
        assert_eq!(e.round_scores.iter().sum::<i32>(), 14);
    }

    proptest! {
        /// For any starting cumulative scores, a moon shot always awards the
        /// shooter either all 26 points or none of them (never split), and
        /// picks the option that keeps the shooter from ending up strictly
        /// behind everyone else whenever the other option would avoid that.
        #[test]
        fn prop_moon_shot_never_leaves_the_shooter_worse_off_when_avoidable(
            shooter in 0usize..4,
            base in proptest::collection::vec(-50i32..50, 4),
        ) {
            let mut e = HeartsEngine::new(200);
            e.cumulative_scores = [base[0], base[1], base[2], base[3]];
            e.tricks_taken = Default::default();
            for rank in Rank::ALL {
                e.tricks_taken[shooter].push(Card::new(Suit::Hearts, rank));
            }
            e.tricks_taken[shooter].push(Card::new(Suit::Spades, Rank::Queen));
            e.phase = Phase::RoundEnd;
            e.apply_round_scoring();

            prop_assert_eq!(e.moon_shooter, Some(shooter as Seat));
            let shooter_round = e.round_scores[shooter];
            prop_assert!(shooter_round == 0 || shooter_round == 26);
            for s in 0..4 {
                if s != shooter {
                    prop_assert_eq!(e.round_scores[s], 26 - shooter_round);
                }
            }

            let cum_a_shooter = base[shooter];
            let others_min_a =
                (0..4).filter(|&s| s != shooter).map(|s| base[s]).min().unwrap();
            let option_a_was_chosen = shooter_round == 0;
            prop_assert_eq!(option_a_was_chosen, cum_a_shooter <= others_min_a);
        }
    }
}
