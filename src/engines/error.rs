//! Shared error type for the three game engines.
//!
//! Engines never know about HTTP, websockets, or the `error { message }`
//! wire event — they return this small, rule-level enum. The Table
//! Controller maps each variant to an [`crate::errors::ErrorCode`] and a
//! human message (see `crate::error::AppError::from`).

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("action not allowed in the current phase")]
    PhaseError,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("that card cannot be played")]
    IllegalCard,
    #[error("invalid pass selection")]
    BadPass,
    #[error("invalid bid")]
    InvalidBid,
    #[error("invalid contract selection")]
    InvalidContract,
    #[error("contract quota exhausted")]
    QuotaExhausted,
    #[error("blind nil is not allowed here")]
    BlindNilNotAllowed,
    #[error("internal engine error")]
    Internal,
}
