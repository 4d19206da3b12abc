//! Error handling for the trickroom table service.

pub mod error_code;

pub use error_code::ErrorCode;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn error_codes_are_unique() {
        let all = [
            ErrorCode::TableNotFound,
            ErrorCode::TableFull,
            ErrorCode::GameInProgress,
            ErrorCode::NameRequired,
            ErrorCode::PhaseError,
            ErrorCode::NotYourTurn,
            ErrorCode::IllegalCard,
            ErrorCode::BadPass,
            ErrorCode::InvalidBid,
            ErrorCode::InvalidContract,
            ErrorCode::QuotaExhausted,
            ErrorCode::BlindNilNotAllowed,
            ErrorCode::BadProtocol,
            ErrorCode::MalformedEvent,
            ErrorCode::InternalError,
        ];
        let set: HashSet<&str> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(set.len(), all.len());
    }
}
