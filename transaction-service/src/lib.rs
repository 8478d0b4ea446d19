//! Transaction processing service
//!
//! The core of the platform: dispatches each transaction request to the
//! effect handler for its kind, applies the balance-mutation rules under
//! per-account guards, and persists the resulting accounts and the
//! transaction record as one atomic unit.

pub mod config;
pub mod locks;
pub mod repository;
pub mod service;
pub mod strategy;

pub use config::TransactionServiceConfig;
pub use locks::AccountLocks;
pub use repository::{
    InMemoryTransactionRepository, PostgresTransactionRepository, TransactionDraft,
    TransactionRepository,
};
pub use service::TransactionService;
pub use strategy::{
    AppliedEffect, DepositStrategy, StrategyRegistry, TransactionStrategy, TransferStrategy,
    WithdrawalStrategy,
};
