//! Configuration for the transaction service

use std::env;
use std::time::Duration;

/// Configuration for the transaction service
#[derive(Debug, Clone)]
pub struct TransactionServiceConfig {
    /// How long to wait for a per-account guard before surfacing contention
    pub lock_timeout: Duration,
}

impl Default for TransactionServiceConfig {
    fn default() -> Self {
        Self {
            lock_timeout: env::var("LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(5)),
        }
    }
}

impl TransactionServiceConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with a custom guard timeout
    pub fn new(lock_timeout: Duration) -> Self {
        Self { lock_timeout }
    }
}
