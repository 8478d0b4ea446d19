// api-gateway/src/lib.rs
pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_service::{AccountService, ClientService};
use transaction_service::TransactionService;

/// App state shared across handlers
pub struct AppState {
    /// Client service
    pub client_service: Arc<ClientService>,
    /// Account service
    pub account_service: Arc<AccountService>,
    /// Transaction service
    pub transaction_service: Arc<TransactionService>,
}
