//! Ledger error types.

use consolidator_shared::types::{Currency, EntityId, RecordId};
use thiserror::Error;

/// Errors returned by a [`super::LedgerSource`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Transport failure or timeout. Safe to retry.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The ERP answered with an error.
    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    /// The ERP answered with a payload that could not be mapped.
    #[error("malformed upstream payload: {0}")]
    Decode(String),
}

impl SourceError {
    /// Returns true if the failure is transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A record was not expressed in the expected currency.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record {record} of entity {entity} is in {found}, expected {expected}")]
pub struct CurrencyMismatch {
    /// Offending record.
    pub record: RecordId,
    /// Entity that booked it.
    pub entity: EntityId,
    /// Currency every record must carry.
    pub expected: Currency,
    /// Currency the record carries.
    pub found: Currency,
}
