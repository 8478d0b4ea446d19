//! Repository for transaction records
//!
//! Records are append-only: they are inserted exactly once with a
//! server-assigned id and timestamp and never updated or deleted.

use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::transaction::{Transaction, TransactionKind};
use dashmap::DashMap;
use sqlx::{PgPool, Row};
use tracing::debug;

/// Draft of a transaction record, before the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Kind of movement
    pub kind: TransactionKind,
    /// Signed amount
    pub amount: Amount,
    /// Source account ID
    pub source_account_id: Option<i64>,
    /// Destination account ID
    pub destination_account_id: Option<i64>,
}

/// Transaction repository trait defining the interface for record storage
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persist a new record, assigning its id and timestamp
    async fn save_transaction(&self, draft: TransactionDraft) -> Result<Transaction>;

    /// Get a record by ID
    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// Get all records debiting the given account
    async fn transactions_by_source(&self, account_id: i64) -> Result<Vec<Transaction>>;

    /// Get all records crediting the given account
    async fn transactions_by_destination(&self, account_id: i64) -> Result<Vec<Transaction>>;

    /// Get all records
    async fn all_transactions(&self) -> Result<Vec<Transaction>>;
}

/// In-memory repository for transaction records
pub struct InMemoryTransactionRepository {
    /// Records by ID
    pub transactions: DashMap<i64, Transaction>,
    /// Id sequence
    next_id: AtomicI64,
}

impl InMemoryTransactionRepository {
    /// Create a new in-memory transaction repository
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryTransactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let transaction = Transaction {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            kind: draft.kind,
            amount: draft.amount,
            source_account_id: draft.source_account_id,
            destination_account_id: draft.destination_account_id,
            occurred_at: Utc::now(),
            source_account: None,
            destination_account: None,
        };

        self.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).map(|t| t.clone()))
    }

    async fn transactions_by_source(&self, account_id: i64) -> Result<Vec<Transaction>> {
        let mut records: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.value().source_account_id == Some(account_id))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|t| t.id);
        Ok(records)
    }

    async fn transactions_by_destination(&self, account_id: i64) -> Result<Vec<Transaction>> {
        let mut records: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.value().destination_account_id == Some(account_id))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|t| t.id);
        Ok(records)
    }

    async fn all_transactions(&self) -> Result<Vec<Transaction>> {
        let mut records: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|t| t.id);
        Ok(records)
    }
}

fn transaction_from_row(row: &sqlx::postgres::PgRow) -> Result<Transaction> {
    let kind: String = row.get("kind");
    let amount_str: String = row.get("amount");

    let amount = amount_str
        .parse::<Amount>()
        .map_err(|e| Error::Internal(format!("Invalid amount format: {}", e)))?;

    Ok(Transaction {
        id: row.get("id"),
        kind: TransactionKind::from_str(&kind).map_err(Error::Internal)?,
        amount,
        source_account_id: row.get("source_account_id"),
        destination_account_id: row.get("destination_account_id"),
        occurred_at: row.get("occurred_at"),
        source_account: None,
        destination_account: None,
    })
}

/// PostgreSQL repository for transaction records
pub struct PostgresTransactionRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresTransactionRepository {
    /// Create a new PostgreSQL transaction repository over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn save_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        debug!("Persisting {} transaction record", draft.kind);

        let row = sqlx::query(
            "INSERT INTO transactions (kind, amount, source_account_id, destination_account_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, kind, amount, source_account_id, destination_account_id, occurred_at",
        )
        .bind(draft.kind.as_str())
        .bind(draft.amount.to_string())
        .bind(draft.source_account_id)
        .bind(draft.destination_account_id)
        .fetch_one(&self.pool)
        .await?;

        transaction_from_row(&row)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            "SELECT id, kind, amount, source_account_id, destination_account_id, occurred_at
             FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(transaction_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn transactions_by_source(&self, account_id: i64) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, kind, amount, source_account_id, destination_account_id, occurred_at
             FROM transactions WHERE source_account_id = $1 ORDER BY id",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn transactions_by_destination(&self, account_id: i64) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, kind, amount, source_account_id, destination_account_id, occurred_at
             FROM transactions WHERE destination_account_id = $1 ORDER BY id",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn all_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT id, kind, amount, source_account_id, destination_account_id, occurred_at
             FROM transactions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }
}
