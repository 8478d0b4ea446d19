//! Domain models for corebank

pub mod account;
pub mod client;
pub mod transaction;
