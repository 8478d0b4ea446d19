//! Account API handlers
//!
//! Handles endpoints related to account management:
//! - Open an account for a client
//! - Get account details and list accounts
//! - Update status/balance and delete accounts

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::model::account::{Account, AccountUpdate, NewAccount};

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::ApiError;
use crate::AppState;

/// Open a new account for a client
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/accounts",
    params(
        ("id" = i64, Path, description = "Owning client ID")
    ),
    request_body = NewAccount,
    responses(
        (status = 200, description = "Account successfully created"),
        (status = 400, description = "Invalid account data"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
    Json(request): Json<NewAccount>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .create_account(client_id, request)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(account))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account details retrieved successfully"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .get_account(id)
        .await
        .map_err(ApiError::Common)?
        .ok_or_else(|| ApiError::NotFound(format!("Account not found: {}", id)))?;

    Ok(ApiResponse::new(account))
}

/// Get all accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<ApiListResponse<Account>, ApiError> {
    let accounts = state
        .account_service
        .all_accounts()
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(accounts))
}

/// Get all accounts owned by a client
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/accounts",
    params(
        ("id" = i64, Path, description = "Owning client ID")
    ),
    responses(
        (status = 200, description = "Accounts retrieved successfully"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_client_accounts(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
) -> Result<ApiListResponse<Account>, ApiError> {
    // Verify the client exists before fetching accounts
    let _ = state
        .client_service
        .get_client(client_id)
        .await
        .map_err(ApiError::Common)?
        .ok_or_else(|| ApiError::NotFound(format!("Client not found: {}", client_id)))?;

    let accounts = state
        .account_service
        .accounts_by_client(client_id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(accounts))
}

/// Update an account's status, balance and GMF flag
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Account updated successfully"),
        (status = 400, description = "Invalid update (e.g. canceling a non-zero balance)"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<AccountUpdate>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .update_account(id, request)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(account))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account deleted successfully"),
        (status = 400, description = "Account still holds funds"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state
        .account_service
        .delete_account(id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(serde_json::json!({ "deleted": id })))
}
