//! Account model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Kind of account a client can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub enum AccountKind {
    Checking,
    Savings,
}

/// Lifecycle status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub enum AccountStatus {
    Active,
    Inactive,
    Canceled,
}

/// Account model
///
/// The account number is derived from the id once it is known, so freshly
/// constructed accounts carry `None` until the two-phase creation flow has
/// completed. The number is immutable after assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// Unique account ID, assigned on first save
    pub id: i64,
    /// Owning client ID
    pub client_id: i64,
    /// Account kind
    pub kind: AccountKind,
    /// Derived, globally unique account number
    pub account_number: Option<String>,
    /// Lifecycle status
    pub status: AccountStatus,
    /// Current balance
    pub balance: Amount,
    /// GMF exemption flag, carried through but never consulted by the
    /// transaction logic
    pub gmf_exempt: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Derive the account number for an id: a kind-specific prefix followed
    /// by the zero-padded id. `53` for savings accounts, `33` otherwise.
    pub fn derive_account_number(kind: AccountKind, id: i64) -> String {
        let prefix = match kind {
            AccountKind::Savings => "53",
            AccountKind::Checking => "33",
        };
        format!("{}{:08}", prefix, id)
    }

    /// Add funds to the balance
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount;
        self.updated_at = Utc::now();
    }

    /// Remove funds from the balance
    pub fn debit(&mut self, amount: Amount) -> Result<(), String> {
        if amount > self.balance {
            return Err(format!(
                "insufficient balance: {} available, {} requested",
                self.balance, amount
            ));
        }

        self.balance -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Inbound shape for opening an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct NewAccount {
    /// Account kind
    pub kind: AccountKind,
    /// Requested status; savings accounts default to ACTIVE when omitted
    pub status: Option<AccountStatus>,
    /// Opening balance
    pub balance: Amount,
    /// GMF exemption flag
    #[serde(default)]
    pub gmf_exempt: bool,
}

/// Fields an account update may change. The account number and kind are
/// immutable once assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct AccountUpdate {
    /// New lifecycle status
    pub status: AccountStatus,
    /// New balance
    pub balance: Amount,
    /// GMF exemption flag
    #[serde(default)]
    pub gmf_exempt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::dec;

    #[test]
    fn account_number_prefixes_by_kind() {
        assert_eq!(
            Account::derive_account_number(AccountKind::Savings, 42),
            "5300000042"
        );
        assert_eq!(
            Account::derive_account_number(AccountKind::Checking, 42),
            "3300000042"
        );
    }

    #[test]
    fn debit_rejects_overdraft() {
        let mut account = Account {
            id: 1,
            client_id: 1,
            kind: AccountKind::Savings,
            account_number: Some(Account::derive_account_number(AccountKind::Savings, 1)),
            status: AccountStatus::Active,
            balance: dec!(10),
            gmf_exempt: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(account.debit(dec!(11)).is_err());
        assert_eq!(account.balance, dec!(10));

        account.debit(dec!(10)).unwrap();
        assert_eq!(account.balance, Amount::ZERO);
    }
}
