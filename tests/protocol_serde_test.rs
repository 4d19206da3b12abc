//! Wire-shape assertions for `ServerEvent`/`ClientEvent` variants not already
//! covered by the inline tests in `protocol::events` (SPEC_FULL §6.1).

use time::OffsetDateTime;

use trickroom::cards::{Card, Rank, Suit};
use trickroom::protocol::events::{
    GameType, PlayerSummary, ServerEvent, TableSummary, TrickPlay,
};

fn epoch() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(0).unwrap()
}

#[test]
fn tables_list_serializes_with_camel_case_fields() {
    let event = ServerEvent::TablesList {
        tables: vec![TableSummary {
            id: "velvet-otter".to_string(),
            game_type: GameType::Hearts,
            player_count: 2,
            has_engine: false,
            spectatable: true,
            has_takeover_seat: false,
        }],
    };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["type"], "tablesList");
    assert_eq!(v["tables"][0]["gameType"], "hearts");
    assert_eq!(v["tables"][0]["playerCount"], 2);
    assert_eq!(v["tables"][0]["hasTakeoverSeat"], false);
}

#[test]
fn table_joined_omits_ending_score_when_absent() {
    let event = ServerEvent::TableJoined {
        table_id: "velvet-otter".to_string(),
        seat: 2,
        game_type: GameType::Spades,
        ending_score: None,
        players: vec![PlayerSummary {
            id: "p0".to_string(),
            name: "ada".to_string(),
            seat: 0,
            connected: true,
        }],
    };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["type"], "tableJoined");
    assert_eq!(v["seat"], 2);
    assert!(v["endingScore"].is_null());
    assert_eq!(v["players"][0]["name"], "ada");
}

#[test]
fn error_event_carries_a_plain_message() {
    let event = ServerEvent::Error { message: "not your turn".to_string() };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["type"], "error");
    assert_eq!(v["message"], "not your turn");
}

#[test]
fn round_end_carries_per_game_scoring_shapes() {
    let hearts_round_end = ServerEvent::RoundEnd {
        round_scores: vec![0, 5, 10, 11],
        cumulative_scores: vec![0, 5, 10, 11],
        moon_shooter: None,
        point_cards_taken: vec![vec![], vec![Card::new(Suit::Hearts, Rank::King)], vec![], vec![]],
        game_over: false,
        game_winner: None,
    };
    let v = serde_json::to_value(&hearts_round_end).unwrap();
    assert_eq!(v["roundScores"].as_array().unwrap().len(), 4);
    assert!(v["moonShooter"].is_null());

    let spades_round_end = ServerEvent::RoundEnd {
        round_scores: vec![130, -50],
        cumulative_scores: vec![130, -50],
        moon_shooter: None,
        point_cards_taken: vec![],
        game_over: true,
        game_winner: Some(vec![0, 2]),
    };
    let v = serde_json::to_value(&spades_round_end).unwrap();
    assert_eq!(v["roundScores"].as_array().unwrap().len(), 2);
    assert_eq!(v["gameWinner"], serde_json::json!([0, 2]));
}

#[test]
fn game_end_round_trips() {
    let event = ServerEvent::GameEnd { winner: vec![1], final_scores: vec![12, 212, 40, 88] };
    let json = serde_json::to_string(&event).unwrap();
    let back: ServerEvent = serde_json::from_str(&json).unwrap();
    match back {
        ServerEvent::GameEnd { winner, final_scores } => {
            assert_eq!(winner, vec![1]);
            assert_eq!(final_scores, vec![12, 212, 40, 88]);
        }
        _ => panic!("expected GameEnd"),
    }
}

#[test]
fn turn_start_serializes_timeout_as_rfc3339() {
    let event = ServerEvent::TurnStart { player: 3, timeout_at: epoch() };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["timeoutAt"], "1970-01-01T00:00:00Z");
}

#[test]
fn card_played_carries_the_running_trick() {
    let event = ServerEvent::CardPlayed {
        seat: 1,
        card: Card::new(Suit::Spades, Rank::Ace),
        current_trick: vec![TrickPlay { seat: 0, card: Card::new(Suit::Spades, Rank::Two) }],
        trick_complete: Some(false),
        winner: None,
    };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["currentTrick"][0]["seat"], 0);
    assert_eq!(v["trickComplete"], false);
    assert!(v["winner"].is_null());
}
