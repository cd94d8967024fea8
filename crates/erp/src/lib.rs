//! Odoo ledger source for Consolidator.
//!
//! Implements the core's `LedgerSource` over Odoo's JSON-RPC
//! `object.execute_kw` endpoint.
//!
//! # Modules
//!
//! - `client` - JSON-RPC transport and response decoding
//! - `mapping` - Move lines to `LedgerRecord`s
//! - `retry` - Exponential backoff for transient failures
//! - `source` - The `LedgerSource` implementation

pub mod client;
pub mod mapping;
pub mod retry;
pub mod source;

pub use client::OdooClient;
pub use mapping::AccountMapping;
pub use retry::RetryPolicy;
pub use source::OdooLedgerSource;
