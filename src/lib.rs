//! JSON CRUD API over a PostgreSQL-backed bank account table.
//!
//! Six endpoints map one-to-one onto storage operations:
//!
//! ```text
//! GET    /init           create the table if missing
//! POST   /account        create an account
//! GET    /accounts       list accounts
//! GET    /account/{id}   fetch one account
//! PUT    /account/{id}   overwrite an account's editable fields
//! DELETE /account/{id}   delete an account
//! ```
//!
//! Failures are rendered as `{"error": "...", "kind": "..."}` with a status
//! chosen by kind (400 validation, 404 not found, 409 conflict,
//! 503 backend unavailable, 500 internal).
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`account`]: Account record and request types
//! - [`storage`]: Storage trait with PostgreSQL and in-memory backends
//! - [`api`]: HTTP handlers, routing and error rendering
//! - [`server`]: Startup sequencing and serving
//! - [`metrics`]: Request and storage metrics
//! - [`utils`]: Utility functions

pub mod account;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError, StorageError};
