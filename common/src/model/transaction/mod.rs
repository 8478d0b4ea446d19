//! Transaction model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
use crate::model::account::Account;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Kind of monetary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionKind {
    /// Wire/storage form of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Transfer => "TRANSFER",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAWAL" => Ok(TransactionKind::Withdrawal),
            "TRANSFER" => Ok(TransactionKind::Transfer),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one executed monetary movement
///
/// A transaction is created exactly once, already in its terminal applied
/// state, and never updated or deleted. Corrections are modeled as new
/// offsetting transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Transaction {
    /// Unique transaction ID, assigned on save
    pub id: i64,
    /// Kind of movement
    pub kind: TransactionKind,
    /// Signed amount; the sign convention differs by kind (deposits and
    /// transfers are positive, withdrawals carry a negative magnitude)
    pub amount: Amount,
    /// Source account, present for withdrawals and transfers
    pub source_account_id: Option<i64>,
    /// Destination account, present for deposits and transfers
    pub destination_account_id: Option<i64>,
    /// Execution timestamp, immutable after creation
    pub occurred_at: DateTime<Utc>,
    /// Resolved source account snapshot, attached on execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<Account>,
    /// Resolved destination account snapshot, attached on execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<Account>,
}

/// Inbound shape for requesting a transaction
///
/// The kind is optional on purpose: a request arriving without one is
/// representable and rejected by the orchestrator rather than at the
/// deserialization boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct TransactionRequest {
    /// Kind of movement
    pub kind: Option<TransactionKind>,
    /// Signed amount
    pub amount: Amount,
    /// Source account ID
    pub source_account_id: Option<i64>,
    /// Destination account ID
    pub destination_account_id: Option<i64>,
}

impl TransactionRequest {
    /// All account ids this request references, ascending and deduplicated.
    /// This is the guard acquisition order.
    pub fn referenced_account_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .source_account_id
            .into_iter()
            .chain(self.destination_account_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::dec;

    fn request(source: Option<i64>, destination: Option<i64>) -> TransactionRequest {
        TransactionRequest {
            kind: Some(TransactionKind::Transfer),
            amount: dec!(1),
            source_account_id: source,
            destination_account_id: destination,
        }
    }

    #[test]
    fn referenced_ids_are_ordered_and_deduped() {
        assert_eq!(request(Some(9), Some(3)).referenced_account_ids(), vec![3, 9]);
        assert_eq!(request(Some(5), Some(5)).referenced_account_ids(), vec![5]);
        assert_eq!(request(None, Some(2)).referenced_account_ids(), vec![2]);
        assert!(request(None, None).referenced_account_ids().is_empty());
    }

    #[test]
    fn kind_serializes_screaming() {
        let json = serde_json::to_string(&TransactionKind::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }
}
