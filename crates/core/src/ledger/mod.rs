//! Ledger record contract and the adapter seam.
//!
//! Every ERP-specific concern stays behind [`LedgerSource`]. The core only sees
//! [`LedgerRecord`]s, already signed from the book-keeping entity's perspective.
//!
//! # Components
//!
//! - `record` - The normalized record shape and its enums
//! - `source` - The async `LedgerSource` trait and query window
//! - `normalize` - Currency conversion and de-duplication
//! - `bank` - Bank accounts and balance totals
//! - `book` - Per-entity fetch results handed to the engines
//! - `cache` - TTL snapshot cache wrapping any source
//! - `memory` - In-memory source for fixtures and tests

pub mod bank;
pub mod book;
pub mod cache;
pub mod error;
pub mod memory;
pub mod normalize;
pub mod record;
pub mod source;

pub use bank::{BankAccount, total_balance};
pub use book::{EntityBook, EntitySnapshot};
pub use cache::CachedLedgerSource;
pub use error::{CurrencyMismatch, SourceError};
pub use memory::InMemoryLedgerSource;
pub use normalize::{NormalizedBook, NormalizedRecords, Normalizer};
pub use record::{
    LedgerRecord, RecordStatus, RecordType, VatDirection, VatTag, VatTreatment, ensure_currency,
};
pub use source::{LedgerSource, QueryWindow};
