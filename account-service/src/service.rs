//! Client and account service implementations

use std::sync::Arc;

use chrono::Utc;
use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::account::{Account, AccountKind, AccountStatus, AccountUpdate, NewAccount};
use common::model::client::{self as client, Client, ClientUpdate, NewClient};
use tracing::info;

use crate::repository::{AccountRepository, ClientRepository};

/// Service for client onboarding and lifecycle
pub struct ClientService {
    /// Repository for client data
    repo: Arc<dyn ClientRepository>,
    /// Repository for account data, consulted before deleting a client
    accounts: Arc<dyn AccountRepository>,
}

impl ClientService {
    /// Create a new client service
    pub fn new(repo: Arc<dyn ClientRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { repo, accounts }
    }

    /// Onboard a new client. Clients must be of age.
    pub async fn create_client(&self, new: NewClient) -> Result<Client> {
        info!("Creating new client {} {}", new.first_name, new.last_name);

        if new.first_name.chars().count() < 2 || new.last_name.chars().count() < 2 {
            return Err(Error::ValidationError(
                "First and last name must have at least 2 characters".to_string(),
            ));
        }

        if !client::is_adult(new.birthdate, Utc::now().date_naive()) {
            return Err(Error::ValidationError(
                "Client must be 18 years or older.".to_string(),
            ));
        }

        self.repo.create_client(new).await
    }

    /// Get a client by ID
    pub async fn get_client(&self, id: i64) -> Result<Option<Client>> {
        self.repo.get_client(id).await
    }

    /// Get all clients
    pub async fn all_clients(&self) -> Result<Vec<Client>> {
        self.repo.all_clients().await
    }

    /// Update a client's name and email
    pub async fn update_client(&self, id: i64, update: ClientUpdate) -> Result<Client> {
        let mut client = self
            .repo
            .get_client(id)
            .await?
            .ok_or_else(|| Error::ClientNotFound(format!("Client not found with ID: {}", id)))?;

        client.first_name = update.first_name;
        client.last_name = update.last_name;
        client.email = update.email;
        client.updated_at = Utc::now();

        self.repo
            .update_client(client)
            .await
            .with_context(|| format!("Failed to update client {}", id))
    }

    /// Delete a client. Clients that still own accounts cannot be deleted.
    pub async fn delete_client(&self, id: i64) -> Result<()> {
        let _client = self
            .repo
            .get_client(id)
            .await?
            .ok_or_else(|| Error::ClientNotFound(format!("Client not found with ID: {}", id)))?;

        let owned = self.accounts.accounts_by_client(id).await?;
        if !owned.is_empty() {
            return Err(Error::ValidationError(
                "Client cannot be deleted because they have associated accounts.".to_string(),
            ));
        }

        self.repo.delete_client(id).await
    }
}

/// Service for account management
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn AccountRepository>,
    /// Repository for client data, consulted on account creation
    clients: Arc<dyn ClientRepository>,
}

impl AccountService {
    /// Create a new account service
    pub fn new(repo: Arc<dyn AccountRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { repo, clients }
    }

    /// Open a new account for a client.
    ///
    /// Creation is two-phase: the account is saved once to obtain its id,
    /// the account number is derived from that id, and the account is saved
    /// again. The number is immutable from then on.
    pub async fn create_account(&self, client_id: i64, new: NewAccount) -> Result<Account> {
        info!("Creating new {:?} account for client {}", new.kind, client_id);

        let _client = self
            .clients
            .get_client(client_id)
            .await
            .with_context(|| format!("Failed to retrieve client {}", client_id))?
            .ok_or_else(|| Error::ClientNotFound(format!("Client not found with ID: {}", client_id)))?;

        if new.status == Some(AccountStatus::Canceled) {
            return Err(Error::ValidationError(
                "Cannot create an account with a CANCELED status".to_string(),
            ));
        }

        let status = match (new.kind, new.status) {
            (_, Some(status)) => status,
            // Savings accounts default to ACTIVE
            (AccountKind::Savings, None) => AccountStatus::Active,
            (AccountKind::Checking, None) => {
                return Err(Error::ValidationError(
                    "Account status is required for checking accounts".to_string(),
                ))
            }
        };

        if new.kind == AccountKind::Savings && new.balance < Amount::ZERO {
            return Err(Error::ValidationError(
                "Savings account balance cannot be negative".to_string(),
            ));
        }

        // Phase one: persist to obtain the id
        let mut account = self.repo.create_account(client_id, new, status).await?;

        // Phase two: derive the number from the id and persist again
        account.account_number = Some(Account::derive_account_number(account.kind, account.id));
        self.repo
            .update_account(account)
            .await
            .with_context(|| "Failed to assign account number")
    }

    /// Get an account by ID
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.repo.get_account(id).await
    }

    /// Get all accounts
    pub async fn all_accounts(&self) -> Result<Vec<Account>> {
        self.repo.all_accounts().await
    }

    /// Get all accounts owned by a client
    pub async fn accounts_by_client(&self, client_id: i64) -> Result<Vec<Account>> {
        self.repo.accounts_by_client(client_id).await
    }

    /// Update an account's status, balance and GMF flag.
    ///
    /// A CANCELED account must have a balance of exactly zero, so canceling
    /// an account still holding funds is rejected.
    pub async fn update_account(&self, id: i64, update: AccountUpdate) -> Result<Account> {
        let mut account = self
            .repo
            .get_account(id)
            .await?
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found with ID: {}", id)))?;

        if update.status == AccountStatus::Canceled && account.balance != Amount::ZERO {
            return Err(Error::ValidationError(
                "Cannot cancel an account with a non-zero balance".to_string(),
            ));
        }

        if account.kind == AccountKind::Savings && update.balance < Amount::ZERO {
            return Err(Error::ValidationError(
                "Savings account balance cannot be negative".to_string(),
            ));
        }

        account.status = update.status;
        account.balance = update.balance;
        account.gmf_exempt = update.gmf_exempt;
        account.updated_at = Utc::now();

        self.repo
            .update_account(account)
            .await
            .with_context(|| format!("Failed to update account {}", id))
    }

    /// Delete an account. Only zero-balance accounts can be deleted.
    pub async fn delete_account(&self, id: i64) -> Result<()> {
        let account = self
            .repo
            .get_account(id)
            .await?
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found with ID: {}", id)))?;

        if account.balance != Amount::ZERO {
            return Err(Error::ValidationError(
                "Cannot delete an account with a non-zero balance".to_string(),
            ));
        }

        self.repo.delete_account(id).await
    }
}
