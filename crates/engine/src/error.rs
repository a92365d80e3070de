//! The module contains the error the engine can throw.
//!
//! Business rejections ([`Forbidden`], [`ExistingKey`], [`InsufficientFunds`]
//! and the invalid-input family) are meant to be shown to the caller.
//! [`Database`] and [`UpstreamUnavailable`] are infrastructure failures.
//!
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`Database`]: EngineError::Database
//!  [`UpstreamUnavailable`]: EngineError::UpstreamUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Exchange rate provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for failures of the storage or the rate provider, as opposed to
    /// rejections caused by the request itself.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::UpstreamUnavailable(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::UpstreamUnavailable(a), Self::UpstreamUnavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
