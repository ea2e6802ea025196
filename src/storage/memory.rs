//! In-memory storage backend.
//!
//! Mirrors the PostgreSQL backend's observable behavior (sequential IDs,
//! unique email/phone/account number, column widths, silent update/delete of
//! missing rows)
//! without a database, so handlers can be tested in process.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::account::{
    Account, AccountId, ACCOUNT_NUMBER_MAX_LEN, CONTACT_MAX_LEN, NAME_MAX_LEN,
};
use crate::error::StorageError;

use super::Storage;

#[derive(Debug, Default)]
struct Table {
    next_id: AccountId,
    rows: BTreeMap<AccountId, Account>,
}

impl Table {
    /// Find a row other than `except` that already holds one of the unique values.
    fn conflict(
        &self,
        except: Option<AccountId>,
        email: &str,
        phone_number: &str,
        account_number: &str,
    ) -> Option<&'static str> {
        self.rows
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .find_map(|(_, row)| {
                if row.email == email {
                    Some("bank_email_key")
                } else if row.phone_number == phone_number {
                    Some("bank_phone_number_key")
                } else if row.account_number == account_number {
                    Some("bank_account_number_key")
                } else {
                    None
                }
            })
    }
}

/// Reject values wider than their `VARCHAR` column, as PostgreSQL does.
fn check_widths(columns: &[(&str, usize)]) -> Result<(), StorageError> {
    match columns
        .iter()
        .find(|(value, max)| value.chars().count() > *max)
    {
        Some((_, max)) => Err(StorageError::Invalid(format!(
            "value too long for type character varying({max})"
        ))),
        None => Ok(()),
    }
}

/// In-memory account storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    table: Arc<Mutex<Table>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every call fails as unreachable.
    pub fn unavailable() -> Self {
        let storage = Self::new();
        storage.set_available(false);
        storage
    }

    /// Toggle simulated backend availability.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether the store holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory storage marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init_db(&self) -> Result<(), StorageError> {
        self.check_available()
    }

    async fn create_account(&self, account: &Account) -> Result<AccountId, StorageError> {
        self.check_available()?;
        check_widths(&[
            (account.first_name.as_str(), NAME_MAX_LEN),
            (account.last_name.as_str(), NAME_MAX_LEN),
            (account.email.as_str(), CONTACT_MAX_LEN),
            (account.phone_number.as_str(), CONTACT_MAX_LEN),
            (account.account_number.as_str(), ACCOUNT_NUMBER_MAX_LEN),
        ])?;
        let mut table = self.lock();

        if let Some(constraint) = table.conflict(
            None,
            &account.email,
            &account.phone_number,
            &account.account_number,
        ) {
            return Err(StorageError::Conflict(format!(
                "duplicate key value violates unique constraint ({constraint})"
            )));
        }

        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(id, account.clone());

        debug!(id, "Account inserted");
        Ok(id)
    }

    async fn update_account(
        &self,
        id: AccountId,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<(), StorageError> {
        self.check_available()?;
        let mut table = self.lock();

        let Some(account_number) = table.rows.get(&id).map(|row| row.account_number.clone())
        else {
            debug!(id, "Update matched no rows");
            return Ok(());
        };

        check_widths(&[
            (first_name, NAME_MAX_LEN),
            (last_name, NAME_MAX_LEN),
            (email, CONTACT_MAX_LEN),
            (phone_number, CONTACT_MAX_LEN),
        ])?;

        if let Some(constraint) = table.conflict(Some(id), email, phone_number, &account_number) {
            return Err(StorageError::Conflict(format!(
                "duplicate key value violates unique constraint ({constraint})"
            )));
        }

        if let Some(row) = table.rows.get_mut(&id) {
            row.first_name = first_name.to_string();
            row.last_name = last_name.to_string();
            row.email = email.to_string();
            row.phone_number = phone_number.to_string();
        }
        Ok(())
    }

    async fn delete_account(&self, id: AccountId) -> Result<(), StorageError> {
        self.check_available()?;
        let removed = self.lock().rows.remove(&id).is_some();
        debug!(id, removed, "Account delete");
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, StorageError> {
        self.check_available()?;
        self.lock()
            .rows
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound { id })
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError> {
        self.check_available()?;
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.check_available()
    }
}
