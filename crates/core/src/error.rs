//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Keep this focused on deterministic, local failures (resolution, status
/// guards, quantity guards, validation). There is no I/O anywhere in the
/// core, so there is no transient/retry-able class: every error aborts one
/// operation with zero partial mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A lot, serial or location code did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation attempted against a blocked, quarantined or terminal entity.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Non-positive quantity where one is required, insufficient stock, or a
    /// mutation that would drive a balance negative.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A required field is missing or inconsistent (e.g. mixed units).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A duplicate business code on creation.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl LedgerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
