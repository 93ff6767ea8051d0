//! Shared types, errors, and configuration for Cuzdan.
//!
//! This crate provides common types used across all other crates:
//! - Username key type for entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Exchange-rate source client

pub mod config;
pub mod error;
pub mod rates;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use rates::{RateError, RateService};
