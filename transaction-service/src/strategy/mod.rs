//! Effect handlers for each transaction kind
//!
//! Each handler validates and applies the balance mutation for one kind of
//! transaction. All handlers follow the same internal ordering: validate the
//! amount, fetch the account(s), check balance sufficiency, and only then
//! mutate and persist, so a failure never leaves a partially applied effect.

use std::collections::HashMap;
use std::sync::Arc;

use account_service::AccountRepository;
use async_trait::async_trait;
use common::error::{Error, Result};
use common::model::account::Account;
use common::model::transaction::{TransactionKind, TransactionRequest};

mod deposit;
mod transfer;
mod withdrawal;

pub use deposit::DepositStrategy;
pub use transfer::TransferStrategy;
pub use withdrawal::WithdrawalStrategy;

/// Post-mutation account snapshots produced by a handler
#[derive(Debug, Clone, Default)]
pub struct AppliedEffect {
    /// Resolved source account, when the kind involves one
    pub source: Option<Account>,
    /// Resolved destination account, when the kind involves one
    pub destination: Option<Account>,
}

/// Validation and mutation logic specific to one transaction kind
#[async_trait]
pub trait TransactionStrategy: Send + Sync {
    /// Validate the request and apply its balance effect through the
    /// repository, returning the resolved account snapshots.
    async fn execute(
        &self,
        request: &TransactionRequest,
        accounts: &dyn AccountRepository,
    ) -> Result<AppliedEffect>;
}

impl std::fmt::Debug for dyn TransactionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransactionStrategy")
    }
}

/// Fixed mapping from transaction kind to effect handler.
///
/// The kind set is closed, so the registry is populated once at process
/// start and passed to the orchestrator by reference. Looking up a kind with
/// no handler is an error, never a silent no-op.
pub struct StrategyRegistry {
    strategies: HashMap<TransactionKind, Arc<dyn TransactionStrategy>>,
}

impl StrategyRegistry {
    /// Create a registry with the three standard handlers
    pub fn new() -> Self {
        let mut strategies: HashMap<TransactionKind, Arc<dyn TransactionStrategy>> = HashMap::new();
        strategies.insert(TransactionKind::Deposit, Arc::new(DepositStrategy));
        strategies.insert(TransactionKind::Withdrawal, Arc::new(WithdrawalStrategy));
        strategies.insert(TransactionKind::Transfer, Arc::new(TransferStrategy));
        Self { strategies }
    }

    /// Create a registry from an explicit mapping (used by tests to exercise
    /// the unregistered-kind path)
    pub fn with_strategies(
        strategies: HashMap<TransactionKind, Arc<dyn TransactionStrategy>>,
    ) -> Self {
        Self { strategies }
    }

    /// Resolve the handler for a kind
    pub fn resolve(&self, kind: TransactionKind) -> Result<Arc<dyn TransactionStrategy>> {
        self.strategies.get(&kind).cloned().ok_or_else(|| {
            Error::UnsupportedTransactionKind(format!("No handler registered for {}", kind))
        })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
