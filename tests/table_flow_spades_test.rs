//! End-to-end Table Controller flow for Spades: four joins start a round,
//! all four bids land, and the opening trick plays legally (SPEC_FULL §A.4).

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use trickroom::protocol::events::{BidWire, GameType, ServerEvent, TableOptions};
use trickroom::table::snapshot::GameEngine;
use trickroom::transport::{ChannelTransport, Outbound};
use trickroom::TableState;

fn channel() -> (Arc<dyn Outbound>, UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = unbounded_channel();
    (Arc::new(ChannelTransport::new(tx)), rx)
}

#[test]
fn four_joins_start_spades_and_all_bids_open_the_first_trick() {
    let mut table = TableState::new("spades-table".into(), GameType::Spades, TableOptions::default());

    for i in 0..4u8 {
        let (conn, _rx) = channel();
        let (seat, _events) = table.join(format!("p{i}"), format!("player{i}"), conn).unwrap();
        assert_eq!(seat, i);
    }
    assert!(table.engine.is_some());

    for seat in 0..4u8 {
        let events = table.submit_bid(seat, BidWire::Number(3));
        assert!(events.iter().any(|o| matches!(o.event, ServerEvent::BidSubmitted { .. })));
    }

    let current = match table.engine.as_ref().unwrap() {
        GameEngine::Spades(e) => e.current_player,
        _ => unreachable!(),
    };
    let legal = table.legal_plays(current);
    assert!(!legal.is_empty());
    let events = table.play_card(current, legal[0]);
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::CardPlayed { .. })));
}

#[test]
fn a_second_bid_from_the_same_seat_is_rejected() {
    let mut table = TableState::new("spades-table-2".into(), GameType::Spades, TableOptions::default());
    for i in 0..4u8 {
        let (conn, _rx) = channel();
        table.join(format!("p{i}"), format!("player{i}"), conn).unwrap();
    }
    table.submit_bid(0, BidWire::Number(3));
    let events = table.submit_bid(0, BidWire::Number(4));
    assert!(events.iter().any(|o| matches!(&o.event, ServerEvent::Error { .. })));
}
