//! Shared types, errors, and configuration for Contabil.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for accounts and journal entries
//! - The `Money` type with exact decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LedgerConfig, ServerConfig};
pub use error::{AppError, AppResult};
