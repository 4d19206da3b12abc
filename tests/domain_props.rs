//! Property tests for the shared card primitives and each engine's legal-play
//! set (SPEC_FULL §A.4: shuffle/deal conservation, legal-card subset
//! property). Grounded in the teacher's `tests/domain_dealing_props.rs`
//! (`proptest!` blocks over a shared `proptest_prelude_config`).

include!("common/proptest_prelude.rs");

use proptest::prelude::*;

use trickroom::cards::{deal, full_deck, new_shuffled_deck_seeded, Card};
use trickroom::engines::king::{Contract, KingEngine};
use trickroom::engines::spades::{Bid, SpadesEngine};
use trickroom::engines::hearts::HeartsEngine;

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Every seeded shuffle-and-deal produces four 13-card hands whose union
    /// is exactly the standard 52-card deck, with no duplicates or drops.
    #[test]
    fn prop_deal_covers_full_deck_exactly_once(seed in any::<u64>()) {
        let deck = new_shuffled_deck_seeded(seed);
        let hands = deal(&deck, 13);
        let mut all: Vec<Card> = hands.into_iter().flatten().collect();
        all.sort();
        let mut expected = full_deck();
        expected.sort();
        prop_assert_eq!(all, expected);
    }

    /// Two distinct seeds are exceedingly unlikely to produce the same deck
    /// order; a fixed seed is always reproducible.
    #[test]
    fn prop_seeded_deck_is_deterministic(seed in any::<u64>()) {
        let a = new_shuffled_deck_seeded(seed);
        let b = new_shuffled_deck_seeded(seed);
        prop_assert_eq!(a, b);
    }

    /// Hearts: whatever the current player's legal-card set is, it is always
    /// a subset of their own hand, and never empty mid-trick.
    #[test]
    fn prop_hearts_legal_plays_is_hand_subset(_seed in any::<u64>()) {
        let mut e = HeartsEngine::new(100);
        e.start_round(4); // Hold direction: skip passing, straight to Playing.
        let seat = e.current_player;
        let legal = e.legal_plays(seat);
        prop_assert!(!legal.is_empty());
        prop_assert!(legal.iter().all(|c| e.hands[seat as usize].contains(c)));
    }

    /// King: after the selector locks in a trump contract, the legal-card
    /// set for whoever leads stays within their own hand.
    #[test]
    fn prop_king_legal_plays_is_hand_subset(selector in 0u8..4) {
        let mut e = KingEngine::new(selector);
        e.select_contract(selector, Contract::Trump(trickroom::cards::Suit::Hearts)).unwrap();
        let seat = e.current_player;
        let legal = e.legal_plays(seat);
        prop_assert!(!legal.is_empty());
        prop_assert!(legal.iter().all(|c| e.hands[seat as usize].contains(c)));
    }

    /// Spades: once all four bids are in, the first lead's legal-card set
    /// stays within their own hand.
    #[test]
    fn prop_spades_legal_plays_is_hand_subset(_seed in any::<u64>()) {
        let mut e = SpadesEngine::new(300);
        for seat in 0..4u8 {
            e.submit_bid(seat, Bid::Number(3)).unwrap();
        }
        let seat = e.current_player;
        let legal = e.legal_plays(seat);
        prop_assert!(!legal.is_empty());
        prop_assert!(legal.iter().all(|c| e.hands[seat as usize].contains(c)));
    }
}
