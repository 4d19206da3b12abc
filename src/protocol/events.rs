//! Wire event protocol (spec §6.1): transport-agnostic client/server event
//! shapes. Mirrors the teacher's `ws::protocol` tagged-enum pattern, but the
//! tag and field names are `camelCase` to match the wire shapes the spec
//! defines (`listTables`, `playerName`, `currentTrick`, ...).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::cards::{Card, Suit};
use crate::engines::king::{Contract, PenaltyName};
use crate::engines::spades::Bid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameType {
    Hearts,
    King,
    Spades,
}

/// Per-table configuration supplied at `createTable` time (spec §6.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    pub ending_score: Option<i32>,
    pub win_threshold: Option<i32>,
    pub initial_selector_seat: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub seat: u8,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: String,
    pub game_type: GameType,
    pub player_count: u8,
    pub has_engine: bool,
    pub spectatable: bool,
    pub has_takeover_seat: bool,
}

/// Wire representation of [`Contract`]. Kept separate from the engine type
/// so the engine never depends on serde or wire-field casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContractWire {
    Penalty { name: PenaltyName },
    Trump { suit: Suit },
}

impl From<Contract> for ContractWire {
    fn from(c: Contract) -> Self {
        match c {
            Contract::Penalty(name) => ContractWire::Penalty { name },
            Contract::Trump(suit) => ContractWire::Trump { suit },
        }
    }
}

impl From<ContractWire> for Contract {
    fn from(c: ContractWire) -> Self {
        match c {
            ContractWire::Penalty { name } => Contract::Penalty(name),
            ContractWire::Trump { suit } => Contract::Trump(suit),
        }
    }
}

/// Wire representation of a Spades [`Bid`]: an integer, or the literal
/// strings `"nil"` / `"blind_nil"` (spec §6.1 `submitBid { bid }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BidWire {
    Number(u8),
    Word(String),
}

impl TryFrom<BidWire> for Bid {
    type Error = ();

    fn try_from(w: BidWire) -> Result<Self, Self::Error> {
        match w {
            BidWire::Number(n) => Ok(Bid::Number(n)),
            BidWire::Word(s) if s == "nil" => Ok(Bid::Nil),
            BidWire::Word(s) if s == "blind_nil" => Ok(Bid::BlindNil),
            BidWire::Word(_) => Err(()),
        }
    }
}

impl From<Bid> for BidWire {
    fn from(b: Bid) -> Self {
        match b {
            Bid::Number(n) => BidWire::Number(n),
            Bid::Nil => BidWire::Word("nil".to_string()),
            Bid::BlindNil => BidWire::Word("blind_nil".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractType {
    Penalty,
    Trump,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrickPlay {
    pub seat: u8,
    pub card: Card,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RematchVotes {
    pub votes: [Option<bool>; 4],
}

/// Client → server events (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    ListTables {
        #[serde(default)]
        game_type: Option<GameType>,
        #[serde(default)]
        include_in_progress: Option<bool>,
    },
    CreateTable {
        player_name: String,
        game_type: GameType,
        #[serde(default)]
        options: TableOptions,
    },
    JoinTable {
        table_id: String,
        player_name: String,
    },
    LeaveTable {},
    SpectateTable {
        table_id: String,
        #[serde(default)]
        player_name: Option<String>,
    },
    LeaveSpectate {},
    SubmitPass {
        cards: Vec<Card>,
    },
    SelectContract {
        contract_type: ContractType,
        #[serde(default)]
        contract_name: Option<PenaltyName>,
        #[serde(default)]
        trump_suit: Option<Suit>,
    },
    SubmitBid {
        bid: BidWire,
    },
    PlayCard {
        card: Card,
    },
    Rematch {
        vote: bool,
    },
    ChatMessage {
        text: String,
    },
    Typing {
        is_typing: bool,
    },
}

/// Server → client events (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    TablesList {
        tables: Vec<TableSummary>,
    },
    TableJoined {
        table_id: String,
        seat: u8,
        game_type: GameType,
        #[serde(default)]
        ending_score: Option<i32>,
        players: Vec<PlayerSummary>,
    },
    SpectateJoined {
        table_id: String,
        game_type: GameType,
        players: Vec<PlayerSummary>,
        game_state: serde_json::Value,
    },
    SpectatorUpdate {
        #[serde(default)]
        game_state: Option<serde_json::Value>,
        #[serde(default)]
        spectator_count: Option<u32>,
    },
    UpdatePlayers {
        players: Vec<PlayerSummary>,
    },
    UpdateGame {
        game_state: serde_json::Value,
    },
    StartGame {
        hand: Vec<Card>,
        #[serde(default)]
        pass_direction: Option<String>,
        phase: String,
        current_player: u8,
        game_type: GameType,
    },
    ContractSelectionStart {
        selector: u8,
        available_contracts: Vec<ContractWire>,
        game_number: u32,
        party_number: u32,
        hand: Vec<Card>,
    },
    ContractSelected {
        contract: ContractWire,
        game_number: u32,
    },
    BiddingStart {
        hand: Vec<Card>,
        current_bidder: u8,
        round_number: u32,
    },
    BidSubmitted {
        seat: u8,
        bid: BidWire,
        bids: Vec<Option<BidWire>>,
        next_bidder: Option<u8>,
    },
    CardPlayed {
        seat: u8,
        card: Card,
        current_trick: Vec<TrickPlay>,
        #[serde(default)]
        trick_complete: Option<bool>,
        #[serde(default)]
        winner: Option<u8>,
    },
    TrickEnd {
        winner: u8,
        points: i32,
        last_trick: Vec<TrickPlay>,
    },
    TurnStart {
        player: u8,
        #[serde(with = "time::serde::rfc3339")]
        timeout_at: OffsetDateTime,
    },
    PassTimerStart {
        #[serde(with = "time::serde::rfc3339")]
        timeout_at: OffsetDateTime,
    },
    SelectTimerStart {
        #[serde(with = "time::serde::rfc3339")]
        timeout_at: OffsetDateTime,
        selector_seat: u8,
    },
    BidTimerStart {
        player: u8,
        #[serde(with = "time::serde::rfc3339")]
        timeout_at: OffsetDateTime,
    },
    TimerWarning {},
    AutoPlay {
        card: Card,
    },
    AutoPassSubmitted {
        cards: Vec<Card>,
    },
    RoundEnd {
        round_scores: Vec<i32>,
        cumulative_scores: Vec<i32>,
        #[serde(default)]
        moon_shooter: Option<u8>,
        point_cards_taken: Vec<Vec<Card>>,
        game_over: bool,
        #[serde(default)]
        game_winner: Option<Vec<u8>>,
    },
    GameEnd {
        winner: Vec<u8>,
        final_scores: Vec<i32>,
    },
    RematchStatus {
        votes: [Option<bool>; 4],
    },
    Chat {
        from: String,
        seat: u8,
        text: String,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    TypingUpdate {
        players: Vec<String>,
    },
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_tag_is_camel_case() {
        let e = ClientEvent::JoinTable {
            table_id: "velvet-otter".to_string(),
            player_name: "ada".to_string(),
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "joinTable");
        assert_eq!(v["tableId"], "velvet-otter");
    }

    #[test]
    fn bid_wire_accepts_number_and_word() {
        let n: BidWire = serde_json::from_str("3").unwrap();
        assert_eq!(n, BidWire::Number(3));
        let w: BidWire = serde_json::from_str("\"nil\"").unwrap();
        assert_eq!(Bid::try_from(w).unwrap(), Bid::Nil);
    }

    #[test]
    fn contract_wire_round_trips() {
        let c = Contract::Penalty(PenaltyName::SonIki);
        let w: ContractWire = c.into();
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "penalty");
        assert_eq!(json["name"], "sonIki");
        let back: Contract = w.into();
        assert_eq!(back, c);
    }
}
