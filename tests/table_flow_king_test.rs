//! End-to-end Table Controller flow for King: four joins start the game at
//! seat 0's selection turn, a trump contract locks in, and the opening trick
//! plays legally (SPEC_FULL §A.4).

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use trickroom::protocol::events::{ContractType, GameType, ServerEvent, TableOptions};
use trickroom::table::snapshot::GameEngine;
use trickroom::transport::{ChannelTransport, Outbound};
use trickroom::TableState;

fn channel() -> (Arc<dyn Outbound>, UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = unbounded_channel();
    (Arc::new(ChannelTransport::new(tx)), rx)
}

#[test]
fn four_joins_start_king_and_the_selector_locks_a_trump_contract() {
    let mut table = TableState::new("king-table".into(), GameType::King, TableOptions::default());

    for i in 0..4u8 {
        let (conn, _rx) = channel();
        let (seat, _events) = table.join(format!("p{i}"), format!("player{i}"), conn).unwrap();
        assert_eq!(seat, i);
    }
    assert!(table.engine.is_some());

    let selector = match table.engine.as_ref().unwrap() {
        GameEngine::King(e) => e.selector_seat,
        _ => unreachable!(),
    };
    assert_eq!(selector, 0);

    let events = table.select_contract(
        selector,
        ContractType::Trump,
        None,
        Some(trickroom::cards::Suit::Hearts),
    );
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::ContractSelected { .. })));

    let current = match table.engine.as_ref().unwrap() {
        GameEngine::King(e) => e.current_player,
        _ => unreachable!(),
    };
    assert_eq!(current, selector);

    let legal = table.legal_plays(current);
    assert!(!legal.is_empty());
    let events = table.play_card(current, legal[0]);
    assert!(events.iter().any(|o| matches!(o.event, ServerEvent::CardPlayed { .. })));
}

#[test]
fn a_non_selector_cannot_lock_in_a_contract() {
    let mut table = TableState::new("king-table-2".into(), GameType::King, TableOptions::default());
    for i in 0..4u8 {
        let (conn, _rx) = channel();
        table.join(format!("p{i}"), format!("player{i}"), conn).unwrap();
    }
    let events = table.select_contract(1, ContractType::Trump, None, Some(trickroom::cards::Suit::Spades));
    assert!(events.iter().any(|o| matches!(&o.event, ServerEvent::Error { .. })));
}
