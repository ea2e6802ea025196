//! Account record and request types.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Database-assigned primary key of an account row.
pub type AccountId = i32;

/// Width of the `first_name` and `last_name` columns, in characters.
pub const NAME_MAX_LEN: usize = 100;
/// Width of the `email` and `phone_number` columns, in characters.
pub const CONTACT_MAX_LEN: usize = 50;
/// Width of the `account_number` column, in characters.
pub const ACCOUNT_NUMBER_MAX_LEN: usize = 100;

/// Body of `POST /account` and `PUT /account/{id}`.
///
/// Every field is required; a missing field fails JSON decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    /// Customer first name.
    pub first_name: String,
    /// Customer last name.
    pub last_name: String,
    /// Contact email (unique).
    pub email: String,
    /// Contact phone number (unique).
    pub phone_number: String,
}

/// A bank customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Customer first name.
    pub first_name: String,
    /// Customer last name.
    pub last_name: String,
    /// Contact email (unique).
    pub email: String,
    /// Contact phone number (unique).
    pub phone_number: String,
    /// System-generated account number, fixed at creation.
    pub account_number: String,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a new account with a freshly generated account number.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            account_number: generate_account_number(),
            created_at: Utc::now(),
        }
    }

    /// Overwrite the four editable fields. The account number is untouched.
    pub fn apply(&mut self, request: AccountRequest) {
        self.first_name = request.first_name;
        self.last_name = request.last_name;
        self.email = request.email;
        self.phone_number = request.phone_number;
    }
}

impl From<AccountRequest> for Account {
    fn from(request: AccountRequest) -> Self {
        Self::new(
            request.first_name,
            request.last_name,
            request.email,
            request.phone_number,
        )
    }
}

/// Generate an account number: a random non-negative integer as decimal text.
pub fn generate_account_number() -> String {
    rand::thread_rng().gen_range(0..i64::MAX).to_string()
}
