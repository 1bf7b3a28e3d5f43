// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for ledger operations.
//!
//! Every failure surfaced by the ledger core falls into exactly one of three
//! characterisations: the input was rejected, the entity is absent (or owned
//! by someone else), or the store failed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed input, rejected before any write.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity absent, or not owned by the requesting user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Store unavailable or the atomic unit failed to commit.
    #[error("Persistence error: {0}")]
    Persistence(#[source] rusqlite::Error),
}

/// Coarse classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn account_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Account",
            id,
        }
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Category",
            id,
        }
    }

    pub fn transaction_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Transaction",
            id,
        }
    }

    pub fn budget_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Budget",
            id,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::error!(error = %err, "store operation failed");
        Self::Persistence(err)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = LedgerError::transaction_not_found(42);
        assert_eq!(err.to_string(), "Transaction not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn sqlite_errors_are_internal() {
        let err: LedgerError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_validation());
    }
}
