//! Storage transaction handling
//!
//! The transaction core treats {fetch accounts, validate, mutate balances,
//! persist accounts, persist transaction record} as one atomic unit of work.
//! This module provides the commit boundary spanning that unit: a trait for
//! beginning transactions plus a PostgreSQL implementation and an in-memory
//! stand-in for tests (the in-memory store itself offers no real rollback;
//! callers compensate by restoring snapshots).

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};

use crate::error::{Error, Result};

/// Storage transaction that can be either PostgreSQL or in-memory
pub enum StoreTransaction {
    /// PostgreSQL transaction
    Postgres(PgStoreTransaction),
    /// In-memory transaction
    InMemory(InMemoryStoreTransaction),
}

impl StoreTransaction {
    /// Commit the transaction
    pub async fn commit(self) -> Result<()> {
        match self {
            StoreTransaction::Postgres(tx) => tx.commit().await,
            StoreTransaction::InMemory(tx) => tx.commit().await,
        }
    }

    /// Rollback the transaction
    pub async fn rollback(self) -> Result<()> {
        match self {
            StoreTransaction::Postgres(tx) => tx.rollback().await,
            StoreTransaction::InMemory(tx) => tx.rollback().await,
        }
    }
}

/// A PostgreSQL storage transaction
pub struct PgStoreTransaction {
    tx: SqlxTransaction<'static, Postgres>,
}

impl PgStoreTransaction {
    /// Create a new PgStoreTransaction
    pub fn new(tx: SqlxTransaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Commit the transaction
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(Error::Database)
    }

    /// Rollback the transaction
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.map_err(Error::Database)
    }
}

/// Transaction manager trait for creating storage transactions
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begin a new storage transaction
    async fn begin_transaction(&self) -> Result<StoreTransaction>;
}

/// A PostgreSQL transaction manager implementation
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    /// Create a new PgTransactionManager
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin_transaction(&self) -> Result<StoreTransaction> {
        let tx = self.pool.begin().await.map_err(Error::Database)?;
        Ok(StoreTransaction::Postgres(PgStoreTransaction::new(tx)))
    }
}

/// In-memory storage transaction for testing
pub struct InMemoryStoreTransaction {
    committed: bool,
    rolled_back: bool,
}

impl InMemoryStoreTransaction {
    /// Create a new in-memory transaction
    pub fn new() -> Self {
        Self {
            committed: false,
            rolled_back: false,
        }
    }

    /// Check if this transaction was committed
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Check if this transaction was rolled back
    pub fn is_rolled_back(&self) -> bool {
        self.rolled_back
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<()> {
        self.committed = true;
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<()> {
        self.rolled_back = true;
        Ok(())
    }
}

impl Default for InMemoryStoreTransaction {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory transaction manager for testing
pub struct InMemoryTransactionManager;

impl InMemoryTransactionManager {
    /// Create a new in-memory transaction manager
    pub fn new() -> Self {
        Self
    }
}

impl Default for InMemoryTransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin_transaction(&self) -> Result<StoreTransaction> {
        Ok(StoreTransaction::InMemory(InMemoryStoreTransaction::new()))
    }
}
