//! Shared types, errors, and configuration for Payplan.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Access token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, PlanningConfig};
pub use error::AppError;
pub use jwt::{JwtConfig, JwtError, JwtService};
