//! Section-level error kinds shared by the engines and the facade.

use consolidator_shared::types::EntityId;
use thiserror::Error;

use crate::ledger::{CurrencyMismatch, SourceError};

/// Why a report section could not be fully produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SectionError {
    /// Invalid entity relationship or currency setup. Fatal to the section.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Some data for an entity or period is missing. Non-fatal.
    #[error("Data incomplete for entity {entity}: {detail}")]
    DataIncomplete {
        /// Affected entity.
        entity: EntityId,
        /// What is missing.
        detail: String,
    },

    /// The ledger source failed for an entity.
    #[error("Upstream unavailable for entity {entity}: {source}")]
    UpstreamUnavailable {
        /// Affected entity.
        entity: EntityId,
        /// Adapter error.
        source: SourceError,
    },
}

impl From<CurrencyMismatch> for SectionError {
    fn from(err: CurrencyMismatch) -> Self {
        Self::Configuration(err.to_string())
    }
}
