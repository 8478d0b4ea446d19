//! Transaction orchestrator
//!
//! Receives a transaction request, resolves the effect handler for its kind,
//! runs it under per-account guards, and persists the mutated account(s) and
//! the transaction record as one atomic unit.

use std::sync::Arc;
use std::time::Duration;

use account_service::AccountRepository;
use common::error::{Error, ErrorExt, Result};
use common::model::account::Account;
use common::model::transaction::{Transaction, TransactionRequest};
use tracing::{debug, error, info};

use crate::config::TransactionServiceConfig;
use crate::locks::AccountLocks;
use crate::repository::{TransactionDraft, TransactionRepository};
use crate::strategy::StrategyRegistry;

/// Transaction service orchestrating validation, dispatch and persistence
pub struct TransactionService {
    /// Repository for transaction records
    repo: Arc<dyn TransactionRepository>,
    /// Repository for account data
    accounts: Arc<dyn AccountRepository>,
    /// Fixed kind-to-handler mapping, built at process start
    registry: Arc<StrategyRegistry>,
    /// Per-account guards
    locks: AccountLocks,
    /// Guard acquisition timeout
    lock_timeout: Duration,
}

impl TransactionService {
    /// Create a new transaction service with the default configuration
    pub fn new(
        repo: Arc<dyn TransactionRepository>,
        accounts: Arc<dyn AccountRepository>,
        registry: Arc<StrategyRegistry>,
    ) -> Self {
        Self::with_config(repo, accounts, registry, TransactionServiceConfig::default())
    }

    /// Create a new transaction service with a specific configuration
    pub fn with_config(
        repo: Arc<dyn TransactionRepository>,
        accounts: Arc<dyn AccountRepository>,
        registry: Arc<StrategyRegistry>,
        config: TransactionServiceConfig,
    ) -> Self {
        Self {
            repo,
            accounts,
            registry,
            locks: AccountLocks::new(),
            lock_timeout: config.lock_timeout,
        }
    }

    /// Execute a transaction request and persist its record.
    ///
    /// The sequence {fetch accounts, validate, mutate balances, persist
    /// accounts, persist record} runs under guards for every referenced
    /// account, taken in ascending id order. A handler failure aborts with
    /// nothing persisted; a persistence failure after mutation is undone by
    /// restoring the pre-execution snapshots before the error surfaces.
    pub async fn create_transaction(&self, request: TransactionRequest) -> Result<Transaction> {
        let kind = request
            .kind
            .ok_or_else(|| Error::InvalidTransaction("Invalid transaction request.".to_string()))?;

        let strategy = self.registry.resolve(kind)?;

        let account_ids = request.referenced_account_ids();
        debug!("Acquiring guards for accounts {:?}", account_ids);
        let _guards = self.locks.acquire(&account_ids, self.lock_timeout).await?;

        // Pre-execution snapshots for compensation; missing accounts are the
        // handler's concern
        let mut snapshots: Vec<Account> = Vec::with_capacity(account_ids.len());
        for &id in &account_ids {
            if let Some(account) = self
                .accounts
                .get_account(id)
                .await
                .with_context(|| format!("Failed to snapshot account {}", id))?
            {
                snapshots.push(account);
            }
        }

        let store_tx = self
            .accounts
            .begin_transaction()
            .await
            .with_context(|| "Failed to start storage transaction")?;

        let unit = async {
            let effect = strategy.execute(&request, self.accounts.as_ref()).await?;

            let record = self
                .repo
                .save_transaction(TransactionDraft {
                    kind,
                    amount: request.amount,
                    source_account_id: request.source_account_id,
                    destination_account_id: request.destination_account_id,
                })
                .await
                .with_context(|| "Failed to persist transaction record")?;

            Ok::<_, Error>((effect, record))
        }
        .await;

        match unit {
            Ok((effect, mut record)) => {
                store_tx
                    .commit()
                    .await
                    .with_context(|| format!("Failed to commit {} transaction", kind))?;

                record.source_account = effect.source;
                record.destination_account = effect.destination;

                info!("Applied {} transaction {}", kind, record.id);
                Ok(record)
            }
            Err(e) => {
                error!("Error applying {} transaction: {}", kind, e);

                if let Err(rollback_err) = store_tx.rollback().await {
                    // Log rollback failure but return the original error
                    error!("Failed to roll back storage transaction: {}", rollback_err);
                }

                self.restore_snapshots(snapshots).await;
                Err(e)
            }
        }
    }

    /// Write pre-execution snapshots back, undoing any balance change that
    /// was persisted before the unit failed. Writing an untouched snapshot
    /// back is an identity update.
    async fn restore_snapshots(&self, snapshots: Vec<Account>) {
        for snapshot in snapshots {
            let id = snapshot.id;
            if let Err(e) = self.accounts.update_account(snapshot).await {
                error!("Failed to restore snapshot of account {}: {}", id, e);
            }
        }
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        self.repo.get_transaction(id).await
    }

    /// Get all transactions debiting an account
    pub async fn transactions_by_source(&self, account_id: i64) -> Result<Vec<Transaction>> {
        self.repo.transactions_by_source(account_id).await
    }

    /// Get all transactions crediting an account
    pub async fn transactions_by_destination(&self, account_id: i64) -> Result<Vec<Transaction>> {
        self.repo.transactions_by_destination(account_id).await
    }

    /// Get all transactions
    pub async fn all_transactions(&self) -> Result<Vec<Transaction>> {
        self.repo.all_transactions().await
    }
}
