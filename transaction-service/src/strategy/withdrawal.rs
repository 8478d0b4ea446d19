//! Withdrawal effect handler

use account_service::AccountRepository;
use async_trait::async_trait;
use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::transaction::TransactionRequest;
use tracing::debug;

use super::{AppliedEffect, TransactionStrategy};

/// Debits the source account by the magnitude of a strictly negative amount.
///
/// A withdrawal request carries the signed movement, and the magnitude is
/// what leaves the account.
pub struct WithdrawalStrategy;

#[async_trait]
impl TransactionStrategy for WithdrawalStrategy {
    async fn execute(
        &self,
        request: &TransactionRequest,
        accounts: &dyn AccountRepository,
    ) -> Result<AppliedEffect> {
        if request.amount >= Amount::ZERO {
            return Err(Error::InvalidAmount(
                "The withdrawal amount must be negative.".to_string(),
            ));
        }

        let source_id = request.source_account_id.ok_or_else(|| {
            Error::InvalidTransaction("A withdrawal requires a source account".to_string())
        })?;

        let mut source = accounts
            .get_account(source_id)
            .await
            .with_context(|| format!("Failed to retrieve account {}", source_id))?
            .ok_or_else(|| {
                Error::AccountNotFound(format!("Account not found with ID: {}", source_id))
            })?;

        let magnitude = request.amount.abs();
        debug!("Withdrawing {} from account {}", magnitude, source_id);

        source.debit(magnitude).map_err(|_| {
            Error::InsufficientBalance(
                "Insufficient balance to complete the transaction.".to_string(),
            )
        })?;

        let source = accounts
            .update_account(source)
            .await
            .with_context(|| format!("Failed to persist withdrawal from account {}", source_id))?;

        Ok(AppliedEffect {
            source: Some(source),
            destination: None,
        })
    }
}
