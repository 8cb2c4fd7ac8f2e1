//! The module contains the error the engine can throw.
//!
//! Every variant maps to a stable code through [`EngineError::code`], which is
//! what callers outside the engine should match on:
//!
//! - [`KeyNotFound`] (`NOT_FOUND`) thrown when an entity is absent.
//! - [`AlreadyCompleted`] (`ALREADY_COMPLETED`) thrown when a quest is
//!   completed twice.
//! - [`InsufficientFunds`] (`INSUFFICIENT_FUNDS`) thrown when a spend would
//!   make a wallet balance negative.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`AlreadyCompleted`]: EngineError::AlreadyCompleted
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Already completed: {0}")]
    AlreadyCompleted(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Cannot delete completed: {0}")]
    CannotDeleteCompleted(String),
    #[error("Cannot skip completed: {0}")]
    CannotSkipCompleted(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" already owned!")]
    AlreadyOwned(String),
    #[error("\"{0}\" not owned!")]
    NotOwned(String),
    #[error("Slot mismatch: {0}")]
    SlotMismatch(String),
    #[error("Idempotency key reused: {0}")]
    IdempotencyKeyReused(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::AlreadyCompleted(_) => "ALREADY_COMPLETED",
            Self::Conflict(_) => "CONFLICT",
            Self::CannotDeleteCompleted(_) => "CANNOT_DELETE_COMPLETED",
            Self::CannotSkipCompleted(_) => "CANNOT_SKIP_COMPLETED",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::AlreadyOwned(_) => "ALREADY_OWNED",
            Self::NotOwned(_) => "NOT_OWNED",
            Self::SlotMismatch(_) => "SLOT_MISMATCH",
            Self::IdempotencyKeyReused(_) => "IDEMPOTENCY_KEY_REUSED",
            Self::InvalidValue(_) => "VALIDATION_ERROR",
            Self::Serialization(_) | Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl EngineError {
    /// Whether SQLite refused the statement because another connection holds
    /// the database lock (`SQLITE_BUSY` and its extended codes).
    pub(crate) fn is_busy(&self) -> bool {
        let Self::Database(DbErr::Conn(err) | DbErr::Exec(err) | DbErr::Query(err)) = self else {
            return false;
        };
        match err {
            RuntimeErr::SqlxError(err) => err
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| matches!(&*code, "5" | "261" | "517" | "773")),
            _ => false,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code() && self.to_string() == other.to_string()
    }
}
