//! Error codes for the trickroom table service.
//!
//! This module defines every error code surfaced to clients. Add new codes
//! here; never pass ad-hoc strings as error codes across module boundaries.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in the `error { message }` wire event (spec §6.1, §7).

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Table / lobby lifecycle
    TableNotFound,
    TableFull,
    GameInProgress,
    NameRequired,

    // Turn / legality
    PhaseError,
    NotYourTurn,
    IllegalCard,
    BadPass,
    InvalidBid,
    InvalidContract,
    QuotaExhausted,
    BlindNilNotAllowed,

    // Transport framing
    BadProtocol,
    MalformedEvent,

    // Catch-all
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::TableFull => "TABLE_FULL",
            ErrorCode::GameInProgress => "GAME_IN_PROGRESS",
            ErrorCode::NameRequired => "NAME_REQUIRED",
            ErrorCode::PhaseError => "PHASE_ERROR",
            ErrorCode::NotYourTurn => "NOT_YOUR_TURN",
            ErrorCode::IllegalCard => "ILLEGAL_CARD",
            ErrorCode::BadPass => "BAD_PASS",
            ErrorCode::InvalidBid => "INVALID_BID",
            ErrorCode::InvalidContract => "INVALID_CONTRACT",
            ErrorCode::QuotaExhausted => "QUOTA_EXHAUSTED",
            ErrorCode::BlindNilNotAllowed => "BLIND_NIL_NOT_ALLOWED",
            ErrorCode::BadProtocol => "BAD_PROTOCOL",
            ErrorCode::MalformedEvent => "MALFORMED_EVENT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Human-readable default message, used when the caller has no more
    /// specific detail to attach.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableFull => "Table is full",
            ErrorCode::GameInProgress => "Game already in progress",
            ErrorCode::NameRequired => "Player name is required",
            ErrorCode::PhaseError => "Action not allowed in the current phase",
            ErrorCode::NotYourTurn => "It is not your turn",
            ErrorCode::IllegalCard => "That card cannot be played",
            ErrorCode::BadPass => "Invalid pass selection",
            ErrorCode::InvalidBid => "Invalid bid",
            ErrorCode::InvalidContract => "Invalid contract selection",
            ErrorCode::QuotaExhausted => "Contract quota exhausted",
            ErrorCode::BlindNilNotAllowed => "Blind nil is not allowed here",
            ErrorCode::BadProtocol => "Unsupported protocol",
            ErrorCode::MalformedEvent => "Malformed event",
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
