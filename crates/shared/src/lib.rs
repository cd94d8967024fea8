//! Shared types, errors, and configuration for Consolidator.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for ERP-backed entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AnalyticsConfig, AppConfig, EntityConfig, EntityRole, ErpConfig, RelationshipConfig,
};
pub use error::{AppError, AppResult};
