//! Top-level application error.
//!
//! Bridges engine-level [`crate::engines::error::DomainError`] and
//! transport/registry-level failures into a single type the Table
//! Controller can log and render as the wire-level `error { message }`
//! event (spec §6.1, §7).

use thiserror::Error;

use crate::engines::error::DomainError;
use crate::errors::ErrorCode;
use crate::protocol::events::ServerEvent;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("{code}: {detail}")]
    Client { code: ErrorCode, detail: String },

    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn client(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Client {
            code,
            detail: detail.into(),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::Client {
            code,
            detail: code.default_message().to_string(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Client { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Render the client-facing message. Internal errors never leak detail;
    /// the caller is expected to have already logged the full detail via
    /// `tracing::error!`.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Client { detail, .. } => detail.clone(),
            AppError::Internal { .. } => ErrorCode::InternalError.default_message().to_string(),
        }
    }

    pub fn to_client_event(&self) -> ServerEvent {
        ServerEvent::Error {
            message: self.client_message(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        // `DomainError::Internal` marks an engine invariant violation, not a
        // client mistake: route it through the no-leak variant instead of
        // echoing `err.to_string()` back onto the wire.
        if matches!(err, DomainError::Internal) {
            tracing::error!(error = %err, "domain engine hit an internal invariant violation");
            return AppError::internal(err.to_string());
        }
        let code = match err {
            DomainError::PhaseError => ErrorCode::PhaseError,
            DomainError::NotYourTurn => ErrorCode::NotYourTurn,
            DomainError::IllegalCard => ErrorCode::IllegalCard,
            DomainError::BadPass => ErrorCode::BadPass,
            DomainError::InvalidBid => ErrorCode::InvalidBid,
            DomainError::InvalidContract => ErrorCode::InvalidContract,
            DomainError::QuotaExhausted => ErrorCode::QuotaExhausted,
            DomainError::BlindNilNotAllowed => ErrorCode::BlindNilNotAllowed,
            DomainError::Internal => unreachable!("handled above"),
        };
        AppError::Client {
            code,
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_internal_error_does_not_leak_detail_to_the_client() {
        let app_err: AppError = DomainError::Internal.into();
        assert!(matches!(app_err, AppError::Internal { .. }));
        assert_eq!(app_err.client_message(), ErrorCode::InternalError.default_message());
        assert_eq!(app_err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn domain_client_error_passes_its_own_message_through() {
        let app_err: AppError = DomainError::NotYourTurn.into();
        assert_eq!(app_err.client_message(), DomainError::NotYourTurn.to_string());
    }
}
