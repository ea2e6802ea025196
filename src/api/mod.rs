//! HTTP API module for account CRUD and operational endpoints.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ErrorKind};
pub use handlers::AppState;
pub use routes::create_router;
