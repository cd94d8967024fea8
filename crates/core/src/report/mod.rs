//! Aggregation and reporting facade.
//!
//! Fetches every entity concurrently, normalizes the results, runs the four
//! engines side by side and wraps each output in a [`Section`] so that one
//! failing engine never hides the others.

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::{ConsolidatedReport, EntitySummary, Section, SectionStatus};
