//! Transfer effect handler

use account_service::AccountRepository;
use async_trait::async_trait;
use common::decimal::Amount;
use common::error::{Error, ErrorExt, Result};
use common::model::transaction::TransactionRequest;
use tracing::debug;

use super::{AppliedEffect, TransactionStrategy};

/// Moves a strictly positive amount from the source account to the
/// destination account. The sum of the two balances is unchanged by the
/// operation.
pub struct TransferStrategy;

#[async_trait]
impl TransactionStrategy for TransferStrategy {
    async fn execute(
        &self,
        request: &TransactionRequest,
        accounts: &dyn AccountRepository,
    ) -> Result<AppliedEffect> {
        let source_id = request.source_account_id.ok_or_else(|| {
            Error::InvalidTransaction("A transfer requires a source account".to_string())
        })?;
        let destination_id = request.destination_account_id.ok_or_else(|| {
            Error::InvalidTransaction("A transfer requires a destination account".to_string())
        })?;

        let mut source = accounts
            .get_account(source_id)
            .await
            .with_context(|| format!("Failed to retrieve account {}", source_id))?
            .ok_or_else(|| {
                Error::AccountNotFound(format!("Account not found with ID: {}", source_id))
            })?;

        // A transfer into the same account is a net no-op but still recorded
        let same_account = source_id == destination_id;
        let mut destination = if same_account {
            None
        } else {
            Some(
                accounts
                    .get_account(destination_id)
                    .await
                    .with_context(|| format!("Failed to retrieve account {}", destination_id))?
                    .ok_or_else(|| {
                        Error::AccountNotFound(format!(
                            "Account not found with ID: {}",
                            destination_id
                        ))
                    })?,
            )
        };

        if request.amount <= Amount::ZERO {
            return Err(Error::InvalidAmount(
                "The transfer amount must be positive.".to_string(),
            ));
        }

        debug!(
            "Transferring {} from account {} to account {}",
            request.amount, source_id, destination_id
        );

        source.debit(request.amount).map_err(|_| {
            Error::InsufficientBalance(
                "Insufficient balance to complete the transaction.".to_string(),
            )
        })?;

        match destination.as_mut() {
            Some(destination) => destination.credit(request.amount),
            None => source.credit(request.amount),
        }

        let source = accounts
            .update_account(source)
            .await
            .with_context(|| format!("Failed to persist debit of account {}", source_id))?;
        let destination = match destination {
            Some(destination) => accounts
                .update_account(destination)
                .await
                .with_context(|| format!("Failed to persist credit of account {}", destination_id))?,
            None => source.clone(),
        };

        Ok(AppliedEffect {
            source: Some(source),
            destination: Some(destination),
        })
    }
}
