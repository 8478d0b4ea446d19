//! Client API handlers
//!
//! Handles endpoints related to client onboarding and lifecycle:
//! - Create, update and delete clients
//! - Get client details and list all clients

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::model::client::{Client, ClientUpdate, NewClient};

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::ApiError;
use crate::AppState;

/// Onboard a new client
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = NewClient,
    responses(
        (status = 200, description = "Client successfully created"),
        (status = 400, description = "Invalid client data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "client"
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewClient>,
) -> Result<ApiResponse<Client>, ApiError> {
    let client = state
        .client_service
        .create_client(request)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(client))
}

/// Get a client by ID
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client details retrieved successfully"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "client"
)]
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Client>, ApiError> {
    let client = state
        .client_service
        .get_client(id)
        .await
        .map_err(ApiError::Common)?
        .ok_or_else(|| ApiError::NotFound(format!("Client not found: {}", id)))?;

    Ok(ApiResponse::new(client))
}

/// Get all clients
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses(
        (status = 200, description = "Clients retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "client"
)]
pub async fn get_clients(
    State(state): State<Arc<AppState>>,
) -> Result<ApiListResponse<Client>, ApiError> {
    let clients = state
        .client_service
        .all_clients()
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(clients))
}

/// Update a client's name and email
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    request_body = ClientUpdate,
    responses(
        (status = 200, description = "Client updated successfully"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "client"
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ClientUpdate>,
) -> Result<ApiResponse<Client>, ApiError> {
    let client = state
        .client_service
        .update_client(id, request)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(client))
}

/// Delete a client
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client deleted successfully"),
        (status = 400, description = "Client still owns accounts"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "client"
)]
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state
        .client_service
        .delete_client(id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(serde_json::json!({ "deleted": id })))
}
