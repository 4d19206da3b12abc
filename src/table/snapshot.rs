//! Per-viewer state projection (spec §4.5 "Spectator projection" /
//! "Broadcasting rule"): a snapshot is a pure function of engine state and
//! viewer identity. Seated players see their own hand; everyone else (other
//! seats, spectators) sees card counts only, never hidden hands.

use serde_json::{json, Value};

use crate::engines::{hearts::HeartsEngine, king::KingEngine, spades::SpadesEngine};
use crate::protocol::events::ContractWire;

/// The live engine for a table, whichever game type it is. A table owns at
/// most one of these at a time (spec §3 Table entity: "engine|null").
pub enum GameEngine {
    Hearts(HeartsEngine),
    King(KingEngine),
    Spades(SpadesEngine),
}

#[derive(Clone, Copy)]
pub enum Viewer {
    Player(u8),
    Spectator,
}

impl GameEngine {
    pub fn hand_for(&self, seat: u8) -> usize {
        match self {
            GameEngine::Hearts(e) => e.hands[seat as usize].len(),
            GameEngine::King(e) => e.hands[seat as usize].len(),
            GameEngine::Spades(e) => e.hands[seat as usize].len(),
        }
    }

    /// Build the `game_state` payload for `updateGame` / `spectateJoined`
    /// (spec §6.1). Hidden hands are replaced by their card count for every
    /// seat other than `viewer`; spectators never see any hand contents.
    pub fn snapshot(&self, viewer: Viewer) -> Value {
        let own_seat = match viewer {
            Viewer::Player(s) => Some(s),
            Viewer::Spectator => None,
        };
        let hand_field = |seat: u8, hand: &[crate::cards::Card]| -> Value {
            if Some(seat) == own_seat {
                json!(hand)
            } else {
                json!({ "count": hand.len() })
            }
        };

        match self {
            GameEngine::Hearts(e) => json!({
                "gameType": "hearts",
                "phase": format!("{:?}", e.phase),
                "roundNumber": e.round_number,
                "passDirection": format!("{:?}", e.pass_direction),
                "hands": (0..4).map(|s| hand_field(s, &e.hands[s as usize])).collect::<Vec<_>>(),
                "currentTrick": e.current_trick,
                "currentPlayer": e.current_player,
                "heartsBroken": e.hearts_broken,
                "tricksPlayed": e.tricks_played,
                "lastTrick": e.last_trick,
                "roundScores": e.round_scores,
                "cumulativeScores": e.cumulative_scores,
                "moonShooter": e.moon_shooter,
            }),
            GameEngine::King(e) => json!({
                "gameType": "king",
                "phase": format!("{:?}", e.phase),
                "gameNumber": e.game_number,
                "selectorSeat": e.selector_seat,
                "contract": e.contract.map(ContractWire::from),
                "hands": (0..4).map(|s| hand_field(s, &e.hands[s as usize])).collect::<Vec<_>>(),
                "currentTrick": e.current_trick,
                "currentPlayer": e.current_player,
                "heartsBroken": e.hearts_broken,
                "trumpBroken": e.trump_broken,
                "tricksPlayed": e.tricks_played,
                "gameScores": e.game_scores,
                "cumulativeScores": e.cumulative_scores,
            }),
            GameEngine::Spades(e) => json!({
                "gameType": "spades",
                "phase": format!("{:?}", e.phase),
                "roundNumber": e.round_number,
                "bids": e.bids.iter().map(|b| b.map(crate::protocol::events::BidWire::from)).collect::<Vec<_>>(),
                "hands": (0..4).map(|s| hand_field(s, &e.hands[s as usize])).collect::<Vec<_>>(),
                "currentTrick": e.current_trick,
                "currentPlayer": e.current_player,
                "spadesBroken": e.spades_broken,
                "teamTricks": e.team_tricks,
                "bags": e.bags,
                "roundScores": e.round_scores,
                "cumulativeScores": e.cumulative_scores,
            }),
        }
    }
}
