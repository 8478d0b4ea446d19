//! Transaction API handlers
//!
//! Handles endpoints related to movements of money:
//! - Submit a deposit, withdrawal or transfer
//! - Get a transaction by ID
//! - List transactions, optionally filtered by source or destination account

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::model::transaction::{Transaction, TransactionRequest};

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::ApiError;
use crate::AppState;

/// Submit a new transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction successfully processed"),
        (status = 400, description = "Invalid transaction request"),
        (status = 404, description = "Referenced account not found"),
        (status = 409, description = "Account guards could not be acquired in time"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transaction"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransactionRequest>,
) -> Result<ApiResponse<Transaction>, ApiError> {
    let transaction = state
        .transaction_service
        .create_transaction(request)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(transaction))
}

/// Get a transaction by ID
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(
        ("id" = i64, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction details retrieved successfully"),
        (status = 404, description = "Transaction not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transaction"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Transaction>, ApiError> {
    let transaction = state
        .transaction_service
        .get_transaction(id)
        .await
        .map_err(ApiError::Common)?
        .ok_or_else(|| ApiError::NotFound(format!("Transaction not found: {}", id)))?;

    Ok(ApiResponse::new(transaction))
}

/// Get all transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    responses(
        (status = 200, description = "Transactions retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transaction"
)]
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<ApiListResponse<Transaction>, ApiError> {
    let transactions = state
        .transaction_service
        .all_transactions()
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(transactions))
}

/// Get all transactions debited from an account
#[utoipa::path(
    get,
    path = "/api/v1/transactions/source/{account_id}",
    params(
        ("account_id" = i64, Path, description = "Source account ID")
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transaction"
)]
pub async fn get_transactions_by_source(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
) -> Result<ApiListResponse<Transaction>, ApiError> {
    let transactions = state
        .transaction_service
        .transactions_by_source(account_id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(transactions))
}

/// Get all transactions credited to an account
#[utoipa::path(
    get,
    path = "/api/v1/transactions/destination/{account_id}",
    params(
        ("account_id" = i64, Path, description = "Destination account ID")
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "transaction"
)]
pub async fn get_transactions_by_destination(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
) -> Result<ApiListResponse<Transaction>, ApiError> {
    let transactions = state
        .transaction_service
        .transactions_by_destination(account_id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(transactions))
}
