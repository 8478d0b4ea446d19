//! Account service for managing clients and their accounts

pub mod config;
pub mod repository;
pub mod service;

pub use config::AccountServiceConfig;
pub use repository::{
    AccountRepository, ClientRepository, InMemoryAccountRepository, InMemoryClientRepository,
    PostgresAccountRepository, PostgresClientRepository,
};
pub use service::{AccountService, ClientService};
