//! End-to-end Table Controller flow for Hearts: four joins deal a round,
//! every seat passes, and the opening trick plays legally (SPEC_FULL §A.4,
//! following the teacher's `tests/game_flow_end_to_end_test.rs` naming).

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use trickroom::protocol::events::{GameType, ServerEvent, TableOptions};
use trickroom::table::snapshot::GameEngine;
use trickroom::transport::{ChannelTransport, Outbound};
use trickroom::TableState;

fn channel() -> (Arc<dyn Outbound>, UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = unbounded_channel();
    (Arc::new(ChannelTransport::new(tx)), rx)
}

#[test]
fn four_joins_deal_a_round_and_the_opening_trick_plays() {
    let options = TableOptions { ending_score: Some(200), ..Default::default() };
    let mut table = TableState::new("velvet-otter".into(), GameType::Hearts, options);

    let mut receivers = Vec::new();
    for i in 0..4u8 {
        let (conn, rx) = channel();
        let (seat, _events) = table.join(format!("p{i}"), format!("player{i}"), conn).unwrap();
        assert_eq!(seat, i);
        receivers.push(rx);
    }
    assert!(table.engine.is_some());

    // Round 1's pass direction is Left, not Hold: every seat must submit a
    // pass before play opens.
    for seat in 0..4u8 {
        let hand = match table.engine.as_ref().unwrap() {
            GameEngine::Hearts(e) => e.hands[seat as usize].clone(),
            _ => unreachable!(),
        };
        table.submit_pass(seat, hand[0..3].to_vec());
    }

    let current = match table.engine.as_ref().unwrap() {
        GameEngine::Hearts(e) => e.current_player,
        _ => unreachable!(),
    };
    // Whoever holds the two of clubs after the exchange must lead it.
    let legal = table.legal_plays(current);
    assert_eq!(legal, vec![trickroom::cards::Card::new(trickroom::cards::Suit::Clubs, trickroom::cards::Rank::Two)]);

    let events = table.play_card(current, legal[0]);
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::CardPlayed { .. })));
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::TurnStart { .. })));
}

#[test]
fn join_rejects_empty_player_name() {
    let mut table = TableState::new("id".into(), GameType::Hearts, TableOptions::default());
    let (conn, _rx) = channel();
    let err = table.join("p0".into(), "   ".into(), conn).unwrap_err();
    assert_eq!(err, trickroom::ErrorCode::NameRequired);
}

#[test]
fn a_disconnected_seat_can_be_taken_over_mid_game() {
    let mut table = TableState::new("id".into(), GameType::Hearts, TableOptions::default());
    for i in 0..4u8 {
        let (conn, _rx) = channel();
        table.join(format!("p{i}"), format!("n{i}"), conn).unwrap();
    }
    assert!(table.engine.is_some());

    table.leave("p1");
    assert!(!table.seats.players[1].as_ref().unwrap().connected);

    let (conn, _rx) = channel();
    let (seat, events) = table.join("p1-again".into(), "returning".into(), conn).unwrap();
    assert_eq!(seat, 1);
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::UpdateGame { .. })));
    assert!(table.seats.players[1].as_ref().unwrap().connected);
}
