//! Card primitives shared by all three engines: suit/rank/card types, deck
//! construction and shuffling, dealing, and trick-winner resolution.
//!
//! Grounded in the teacher's `domain::cards` (card types + serde) and
//! `domain::dealing` (deterministic shuffle-and-deal) modules, generalized
//! from a fixed 52-card/13-card-hand Hearts-style deal to the
//! engine-specific hand sizes each of Hearts/King/Spades needs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engines::error::DomainError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub(crate) fn char(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub(crate) fn from_char(c: char) -> Option<Suit> {
        match c {
            'C' | 'c' => Some(Suit::Clubs),
            'D' | 'd' => Some(Suit::Diamonds),
            'H' | 'h' => Some(Suit::Hearts),
            'S' | 's' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.char().to_string())
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let c = s.chars().next().ok_or_else(|| serde::de::Error::custom("empty suit"))?;
        Suit::from_char(c).ok_or_else(|| serde::de::Error::custom(format!("bad suit: {s:?}")))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    fn char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    fn from_char(c: char) -> Option<Rank> {
        match c {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' | 't' => Some(Rank::Ten),
            'J' | 'j' => Some(Rank::Jack),
            'Q' | 'q' => Some(Rank::Queen),
            'K' | 'k' => Some(Rank::King),
            'A' | 'a' => Some(Rank::Ace),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    pub fn is_queen_of_spades(self) -> bool {
        self.suit == Suit::Spades && self.rank == Rank::Queen
    }

    pub fn is_king_of_hearts(self) -> bool {
        self.suit == Suit::Hearts && self.rank == Rank::King
    }
}

// Ord/Eq on Card is for stable hand sorting only: suit order then rank
// ascending. Engines that need a different suit order (King's trump
// contracts, Spades' spades-are-trump) sort explicitly; do not rely on this
// for trick resolution.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.suit.cmp(&other.suit) {
            std::cmp::Ordering::Equal => self.rank.cmp(&other.rank),
            ord => ord,
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!("{}{}", self.rank.char(), self.suit.char());
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_card_str(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_card_str(s: &str) -> Result<Card, String> {
    let mut chars = s.chars();
    let rank_ch = chars.next().ok_or_else(|| format!("empty card: {s:?}"))?;
    let suit_ch = chars.next().ok_or_else(|| format!("short card: {s:?}"))?;
    if chars.next().is_some() {
        return Err(format!("card too long: {s:?}"));
    }
    let rank = Rank::from_char(rank_ch).ok_or_else(|| format!("bad rank in {s:?}"))?;
    let suit = Suit::from_char(suit_ch).ok_or_else(|| format!("bad suit in {s:?}"))?;
    Ok(Card { suit, rank })
}

/// Build the standard 52-card deck in deck order (not shuffled).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Fisher-Yates shuffle producing a uniformly random permutation.
pub fn new_shuffled_deck() -> Vec<Card> {
    let mut deck = full_deck();
    deck.shuffle(&mut rand::rng());
    deck
}

/// Deterministic variant for property tests and seeded scenarios (spec §8
/// end-to-end scenarios require a fixed deck order for reproducibility).
pub fn new_shuffled_deck_seeded(seed: u64) -> Vec<Card> {
    let mut deck = full_deck();
    let mut rng = StdRng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    deck
}

/// Deal a freshly shuffled deck round-robin into four hands of `hand_size`
/// cards each (`card i` goes to seat `i mod 4`), then canonically sort each
/// hand. Any undealt remainder is discarded.
pub fn deal(deck: &[Card], hand_size: usize) -> [Vec<Card>; 4] {
    let mut hands: [Vec<Card>; 4] = Default::default();
    for (i, card) in deck.iter().enumerate().take(hand_size * 4) {
        hands[i % 4].push(*card);
    }
    for hand in &mut hands {
        hand.sort();
    }
    hands
}

/// Resolve the winner of a completed trick of exactly four `(seat, card)`
/// plays. `trump`, if set, beats the led suit. Fails only if the trick is
/// not exactly length 4.
pub fn trick_winner(trick: &[(u8, Card)], trump: Option<Suit>) -> Result<u8, DomainError> {
    if trick.len() != 4 {
        return Err(DomainError::Internal);
    }
    let led_suit = trick[0].1.suit;
    let trump_play = trump.and_then(|t| {
        trick
            .iter()
            .filter(|(_, c)| c.suit == t)
            .max_by_key(|(_, c)| c.rank)
    });
    let winner = match trump_play {
        Some((seat, _)) => *seat,
        None => {
            trick
                .iter()
                .filter(|(_, c)| c.suit == led_suit)
                .max_by_key(|(_, c)| c.rank)
                .expect("trick always has at least the lead card")
                .0
        }
    };
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_then_deal_preserves_multiset() {
        let deck = new_shuffled_deck_seeded(12345);
        let hands = deal(&deck, 13);
        let mut all: Vec<Card> = hands.into_iter().flatten().collect();
        all.sort();
        let mut expected = full_deck();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn deal_hands_are_sorted() {
        let deck = new_shuffled_deck_seeded(99999);
        let hands = deal(&deck, 13);
        for hand in &hands {
            let mut sorted = hand.clone();
            sorted.sort();
            assert_eq!(hand, &sorted);
        }
    }

    #[test]
    fn seeded_deck_is_deterministic() {
        let a = new_shuffled_deck_seeded(42);
        let b = new_shuffled_deck_seeded(42);
        assert_eq!(a, b);
    }

    #[test]
    fn card_serde_roundtrip() {
        let c = Card::new(Suit::Spades, Rank::Queen);
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(s, "\"QS\"");
        let back: Card = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn trick_winner_no_trump_highest_led_suit() {
        let trick = vec![
            (0, Card::new(Suit::Clubs, Rank::Five)),
            (1, Card::new(Suit::Hearts, Rank::Ace)),
            (2, Card::new(Suit::Clubs, Rank::King)),
            (3, Card::new(Suit::Clubs, Rank::Two)),
        ];
        assert_eq!(trick_winner(&trick, None).unwrap(), 2);
    }

    #[test]
    fn trick_winner_with_trump() {
        let trick = vec![
            (0, Card::new(Suit::Clubs, Rank::Ace)),
            (1, Card::new(Suit::Hearts, Rank::Two)),
            (2, Card::new(Suit::Clubs, Rank::King)),
            (3, Card::new(Suit::Clubs, Rank::Queen)),
        ];
        assert_eq!(trick_winner(&trick, Some(Suit::Hearts)).unwrap(), 1);
    }

    #[test]
    fn trick_winner_requires_four_plays() {
        let trick = vec![(0, Card::new(Suit::Clubs, Rank::Ace))];
        assert!(trick_winner(&trick, None).is_err());
    }
}
