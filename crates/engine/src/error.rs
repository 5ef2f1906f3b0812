//! The module contains the error the engine can throw.
//!
//! Every variant maps to one stable error kind (see [`EngineError::kind`]) so
//! callers can render a user facing message without matching on text:
//!
//! - [`Unauthenticated`] no principal could be resolved.
//! - [`Forbidden`] the principal lacks the role or ownership required.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`SlotConflict`] the requested window overlaps an existing booking.
//! - [`QuotaExceeded`] a non-admin beneficiary already holds a future booking.
//! - [`Database`] the relational store failed.
//!
//!  [`Unauthenticated`]: EngineError::Unauthenticated
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`SlotConflict`]: EngineError::SlotConflict
//!  [`QuotaExceeded`]: EngineError::QuotaExceeded
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Slot conflict: {0}")]
    SlotConflict(String),
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable, machine readable kind of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden(_) => "permission_denied",
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) => "already_exists",
            Self::SlotConflict(_) => "slot_conflict",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::Validation(_) => "validation_error",
            Self::Database(_) => "dependency_failure",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthenticated, Self::Unauthenticated) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::SlotConflict(a), Self::SlotConflict(b)) => a == b,
            (Self::QuotaExceeded(a), Self::QuotaExceeded(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EngineError::Unauthenticated.kind(), "unauthenticated");
        assert_eq!(
            EngineError::SlotConflict("east".to_string()).kind(),
            "slot_conflict"
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            "dependency_failure"
        );
    }
}
