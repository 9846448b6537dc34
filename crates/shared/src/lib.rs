//! Shared types, errors, and configuration for Acopio.
//!
//! This crate provides common types used across all other crates:
//! - Quantity types with decimal precision and site units
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, BudgetPolicy};
pub use error::{AppError, AppResult};
