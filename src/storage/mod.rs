//! Storage layer for account records.
//!
//! This module handles:
//! - The [`Storage`] trait every backend implements
//! - PostgreSQL backend over a sqlx connection pool
//! - In-memory backend for tests and local runs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::account::{Account, AccountId};
use crate::error::StorageError;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

/// Persistence operations over the account table.
///
/// Each call is a single autocommit statement; nothing spans calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the account table if it does not exist.
    async fn init_db(&self) -> Result<(), StorageError>;

    /// Insert a new account and return its assigned ID.
    async fn create_account(&self, account: &Account) -> Result<AccountId, StorageError>;

    /// Overwrite the editable fields of an account.
    ///
    /// Succeeds even when no row has `id`.
    async fn update_account(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<(), StorageError>;

    /// Delete an account. Succeeds even when no row has `id`.
    async fn delete_account(&self, id: AccountId) -> Result<(), StorageError>;

    /// Fetch one account.
    async fn get_account(&self, id: AccountId) -> Result<Account, StorageError>;

    /// Fetch every account in natural table order.
    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StorageError>;
}
