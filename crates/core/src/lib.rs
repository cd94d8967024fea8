//! Core analytics for Consolidator.
//!
//! This crate contains pure analytics with ZERO web or ERP transport dependencies.
//! The only effectful seam is the [`ledger::LedgerSource`] trait; everything
//! downstream of a fetched snapshot is a pure function.
//!
//! # Modules
//!
//! - `entity` - Legal entities and their intercompany relationship graph
//! - `currency` - Conversion and Banker's Rounding
//! - `ledger` - Record contract, adapter seam, normalization and snapshot cache
//! - `reconciliation` - Intercompany current-account positions and breaks
//! - `vat` - VAT aggregation and risk rules
//! - `cashflow` - Weekly cash projection from open items
//! - `overview` - Year-to-date profit and loss, debtors and creditors
//! - `report` - Facade composing all engines into one report

pub mod cashflow;
pub mod currency;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod overview;
pub mod reconciliation;
pub mod report;
pub mod vat;

pub use error::SectionError;
