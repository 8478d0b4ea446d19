//! Repositories for client and account data

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::db::{InMemoryTransactionManager, PgTransactionManager};
use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::account::{Account, AccountKind, AccountStatus, NewAccount};
use common::model::client::{Client, NewClient};
use common::{StoreTransaction, TransactionManager};
use dashmap::DashMap;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::{debug, info};

/// Client repository trait defining the interface for client data storage
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Create a new client
    async fn create_client(&self, new: NewClient) -> Result<Client>;

    /// Get a client by ID
    async fn get_client(&self, id: i64) -> Result<Option<Client>>;

    /// Update a client
    async fn update_client(&self, client: Client) -> Result<Client>;

    /// Delete a client
    async fn delete_client(&self, id: i64) -> Result<()>;

    /// Get all clients
    async fn all_clients(&self) -> Result<Vec<Client>>;
}

/// Account repository trait defining the interface for account data storage
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Get the transaction manager
    fn transaction_manager(&self) -> &dyn TransactionManager;

    /// Create a new account, assigning its id
    async fn create_account(&self, client_id: i64, new: NewAccount, status: AccountStatus)
        -> Result<Account>;

    /// Get an account by ID
    async fn get_account(&self, id: i64) -> Result<Option<Account>>;

    /// Update an account
    async fn update_account(&self, account: Account) -> Result<Account>;

    /// Delete an account
    async fn delete_account(&self, id: i64) -> Result<()>;

    /// Get all accounts
    async fn all_accounts(&self) -> Result<Vec<Account>>;

    /// Get all accounts owned by a client
    async fn accounts_by_client(&self, client_id: i64) -> Result<Vec<Account>>;

    /// Begin a storage transaction
    async fn begin_transaction(&self) -> Result<StoreTransaction> {
        self.transaction_manager().begin_transaction().await
    }
}

/// In-memory repository for client data
pub struct InMemoryClientRepository {
    /// Clients by ID
    pub clients: DashMap<i64, Client>,
    /// Id sequence
    next_id: AtomicI64,
}

impl InMemoryClientRepository {
    /// Create a new in-memory client repository
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryClientRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn create_client(&self, new: NewClient) -> Result<Client> {
        let now = Utc::now();
        let client = Client {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            identification_type: new.identification_type,
            identification_number: new.identification_number,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            birthdate: new.birthdate,
            created_at: now,
            updated_at: now,
        };

        self.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client(&self, id: i64) -> Result<Option<Client>> {
        Ok(self.clients.get(&id).map(|c| c.clone()))
    }

    async fn update_client(&self, client: Client) -> Result<Client> {
        if !self.clients.contains_key(&client.id) {
            return Err(Error::ClientNotFound(format!("Client not found with ID: {}", client.id)));
        }

        self.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn delete_client(&self, id: i64) -> Result<()> {
        self.clients
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::ClientNotFound(format!("Client not found with ID: {}", id)))
    }

    async fn all_clients(&self) -> Result<Vec<Client>> {
        Ok(self.clients.iter().map(|entry| entry.value().clone()).collect())
    }
}

/// In-memory repository for account data
pub struct InMemoryAccountRepository {
    /// Accounts by ID
    pub accounts: DashMap<i64, Account>,
    /// Id sequence
    next_id: AtomicI64,
    /// Transaction manager
    transaction_manager: InMemoryTransactionManager,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory account repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicI64::new(1),
            transaction_manager: InMemoryTransactionManager::new(),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    fn transaction_manager(&self) -> &dyn TransactionManager {
        &self.transaction_manager
    }

    async fn create_account(
        &self,
        client_id: i64,
        new: NewAccount,
        status: AccountStatus,
    ) -> Result<Account> {
        let now = Utc::now();
        let account = Account {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            client_id,
            kind: new.kind,
            account_number: None,
            status,
            balance: new.balance,
            gmf_exempt: new.gmf_exempt,
            created_at: now,
            updated_at: now,
        };

        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn update_account(&self, account: Account) -> Result<Account> {
        if !self.accounts.contains_key(&account.id) {
            return Err(Error::AccountNotFound(format!("Account not found with ID: {}", account.id)));
        }

        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        self.accounts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found with ID: {}", id)))
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn accounts_by_client(&self, client_id: i64) -> Result<Vec<Account>> {
        let accounts = self
            .accounts
            .iter()
            .filter(|entry| entry.value().client_id == client_id)
            .map(|entry| entry.value().clone())
            .collect();

        Ok(accounts)
    }
}

fn kind_to_str(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Checking => "CHECKING",
        AccountKind::Savings => "SAVINGS",
    }
}

fn kind_from_str(s: &str) -> Result<AccountKind> {
    match s {
        "CHECKING" => Ok(AccountKind::Checking),
        "SAVINGS" => Ok(AccountKind::Savings),
        other => Err(Error::Internal(format!("Unknown account kind in storage: {}", other))),
    }
}

fn status_to_str(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "ACTIVE",
        AccountStatus::Inactive => "INACTIVE",
        AccountStatus::Canceled => "CANCELED",
    }
}

fn status_from_str(s: &str) -> Result<AccountStatus> {
    match s {
        "ACTIVE" => Ok(AccountStatus::Active),
        "INACTIVE" => Ok(AccountStatus::Inactive),
        "CANCELED" => Ok(AccountStatus::Canceled),
        other => Err(Error::Internal(format!("Unknown account status in storage: {}", other))),
    }
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Result<Account> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    let balance_str: String = row.get("balance");

    let balance = balance_str
        .parse::<Amount>()
        .map_err(|e| Error::Internal(format!("Invalid balance format: {}", e)))?;

    Ok(Account {
        id: row.get("id"),
        client_id: row.get("client_id"),
        kind: kind_from_str(&kind)?,
        account_number: row.get("account_number"),
        status: status_from_str(&status)?,
        balance,
        gmf_exempt: row.get("gmf_exempt"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn client_from_row(row: &sqlx::postgres::PgRow) -> Client {
    Client {
        id: row.get("id"),
        identification_type: row.get("identification_type"),
        identification_number: row.get("identification_number"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        birthdate: row.get("birthdate"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL repository for client data
pub struct PostgresClientRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresClientRepository {
    /// Create a new PostgreSQL client repository over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn create_client(&self, new: NewClient) -> Result<Client> {
        debug!("Creating new client in database");

        let row = sqlx::query(
            "INSERT INTO clients
                 (identification_type, identification_number, first_name, last_name, email, birthdate)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, identification_type, identification_number, first_name, last_name,
                       email, birthdate, created_at, updated_at",
        )
        .bind(&new.identification_type)
        .bind(&new.identification_number)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(new.birthdate)
        .fetch_one(&self.pool)
        .await?;

        Ok(client_from_row(&row))
    }

    async fn get_client(&self, id: i64) -> Result<Option<Client>> {
        debug!("Getting client from database: {}", id);

        let row = sqlx::query(
            "SELECT id, identification_type, identification_number, first_name, last_name,
                    email, birthdate, created_at, updated_at
             FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| client_from_row(&r)))
    }

    async fn update_client(&self, client: Client) -> Result<Client> {
        debug!("Updating client in database: {}", client.id);

        let result = sqlx::query(
            "UPDATE clients
             SET first_name = $2, last_name = $3, email = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(format!("Client not found with ID: {}", client.id)));
        }

        Ok(client)
    }

    async fn delete_client(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ClientNotFound(format!("Client not found with ID: {}", id)));
        }

        Ok(())
    }

    async fn all_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            "SELECT id, identification_type, identification_number, first_name, last_name,
                    email, birthdate, created_at, updated_at
             FROM clients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(client_from_row).collect())
    }
}

/// PostgreSQL repository for account data
pub struct PostgresAccountRepository {
    /// Database connection pool
    pool: PgPool,
    /// Transaction manager
    transaction_manager: PgTransactionManager,
}

impl PostgresAccountRepository {
    /// Create a new PostgreSQL account repository over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            transaction_manager: PgTransactionManager::new(pool.clone()),
            pool,
        }
    }

    /// Create a new PostgreSQL account repository with configuration
    pub async fn with_config(config: &crate::config::AccountServiceConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size)
            .connect(&config.database_url)
            .await
            .map_err(Error::Database)?;

        info!("Connected to PostgreSQL database");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    fn transaction_manager(&self) -> &dyn TransactionManager {
        &self.transaction_manager
    }

    async fn create_account(
        &self,
        client_id: i64,
        new: NewAccount,
        status: AccountStatus,
    ) -> Result<Account> {
        debug!("Creating new account in database for client {}", client_id);

        let row = sqlx::query(
            "INSERT INTO accounts (client_id, kind, status, balance, gmf_exempt)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, client_id, kind, account_number, status, balance, gmf_exempt,
                       created_at, updated_at",
        )
        .bind(client_id)
        .bind(kind_to_str(new.kind))
        .bind(status_to_str(status))
        .bind(new.balance.to_string())
        .bind(new.gmf_exempt)
        .fetch_one(&self.pool)
        .await?;

        account_from_row(&row)
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        debug!("Getting account from database: {}", id);

        let row = sqlx::query(
            "SELECT id, client_id, kind, account_number, status, balance, gmf_exempt,
                    created_at, updated_at
             FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(account_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_account(&self, account: Account) -> Result<Account> {
        debug!("Updating account in database: {}", account.id);

        let result = sqlx::query(
            "UPDATE accounts
             SET account_number = $2, status = $3, balance = $4, gmf_exempt = $5,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(account.id)
        .bind(&account.account_number)
        .bind(status_to_str(account.status))
        .bind(account.balance.to_string())
        .bind(account.gmf_exempt)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound(format!("Account not found with ID: {}", account.id)));
        }

        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound(format!("Account not found with ID: {}", id)));
        }

        Ok(())
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, client_id, kind, account_number, status, balance, gmf_exempt,
                    created_at, updated_at
             FROM accounts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }

    async fn accounts_by_client(&self, client_id: i64) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, client_id, kind, account_number, status, balance, gmf_exempt,
                    created_at, updated_at
             FROM accounts WHERE client_id = $1 ORDER BY id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }
}
