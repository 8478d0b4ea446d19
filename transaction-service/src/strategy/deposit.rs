//! Deposit effect handler

use account_service::AccountRepository;
use async_trait::async_trait;
use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::transaction::TransactionRequest;
use tracing::debug;

use super::{AppliedEffect, TransactionStrategy};

/// Credits the destination account with a strictly positive amount
pub struct DepositStrategy;

#[async_trait]
impl TransactionStrategy for DepositStrategy {
    async fn execute(
        &self,
        request: &TransactionRequest,
        accounts: &dyn AccountRepository,
    ) -> Result<AppliedEffect> {
        if request.amount <= Amount::ZERO {
            return Err(Error::InvalidAmount(
                "The deposit amount must be positive.".to_string(),
            ));
        }

        let destination_id = request.destination_account_id.ok_or_else(|| {
            Error::InvalidTransaction("A deposit requires a destination account".to_string())
        })?;

        let mut destination = accounts
            .get_account(destination_id)
            .await
            .with_context(|| format!("Failed to retrieve account {}", destination_id))?
            .ok_or_else(|| {
                Error::AccountNotFound(format!("Account not found with ID: {}", destination_id))
            })?;

        debug!("Depositing {} into account {}", request.amount, destination_id);

        destination.credit(request.amount);
        let destination = accounts
            .update_account(destination)
            .await
            .with_context(|| format!("Failed to persist deposit to account {}", destination_id))?;

        Ok(AppliedEffect {
            source: None,
            destination: Some(destination),
        })
    }
}
