//! Common types and utilities for corebank
//!
//! This library contains shared types, utilities, and abstractions used across
//! all services in the platform. It provides a unified approach to error
//! handling, database access, and domain models.

pub mod db;
pub mod decimal;
pub mod error;
pub mod model;

/// Re-export important types
pub use decimal::*;
pub use error::{Error, ErrorExt, IntoError, Result};

// Re-export database types
pub use db::transaction::{StoreTransaction, TransactionManager};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
