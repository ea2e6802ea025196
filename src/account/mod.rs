//! Account domain types.
//!
//! This module handles:
//! - The persisted [`Account`] record
//! - The [`AccountRequest`] body accepted by create and update
//! - Account number generation

pub mod types;

pub use types::{
    generate_account_number, Account, AccountId, AccountRequest, ACCOUNT_NUMBER_MAX_LEN,
    CONTACT_MAX_LEN, NAME_MAX_LEN,
};
