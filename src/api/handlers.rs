//! HTTP API handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{info, warn};

use super::error::ApiError;
use super::extractors::AccountIdPath;
use crate::account::{Account, AccountRequest};
use crate::metrics;
use crate::storage::Storage;

/// Response to `GET /init`.
pub const MSG_DB_INITIALIZED: &str = "database successfully intialized";
/// Response to `POST /account`.
pub const MSG_ACCOUNT_CREATED: &str = "account created successfully";
/// Response to `PUT /account/{id}`.
pub const MSG_ACCOUNT_UPDATED: &str = "account updated successfully";
/// Response to `DELETE /account/{id}`.
pub const MSG_ACCOUNT_DELETED: &str = "account deleted successfully";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account storage backend.
    pub storage: Arc<dyn Storage>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state over a storage backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the database answered.
    pub ready: bool,
}

/// GET /init - create the account table.
pub async fn init_db(State(state): State<AppState>) -> Result<Json<&'static str>, ApiError> {
    state.storage.init_db().await?;
    Ok(Json(MSG_DB_INITIALIZED))
}

/// POST /account - create an account from the request body.
pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<&'static str>, ApiError> {
    let Json(request) = payload?;
    let account = Account::from(request);

    let id = state.storage.create_account(&account).await?;
    metrics::inc_accounts_created();
    info!(id, account_number = %account.account_number, "Account created");

    Ok(Json(MSG_ACCOUNT_CREATED))
}

/// GET /accounts - list every account.
pub async fn get_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.storage.get_accounts().await?;
    Ok(Json(accounts))
}

/// GET /account/{id} - fetch one account.
pub async fn get_account(
    State(state): State<AppState>,
    AccountIdPath(id): AccountIdPath,
) -> Result<Json<Account>, ApiError> {
    let account = state.storage.get_account(id).await?;
    Ok(Json(account))
}

/// PUT /account/{id} - overwrite all editable fields.
pub async fn update_account(
    State(state): State<AppState>,
    AccountIdPath(id): AccountIdPath,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<&'static str>, ApiError> {
    let Json(request) = payload?;

    state
        .storage
        .update_account(
            id,
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.phone_number,
        )
        .await?;
    info!(id, "Account updated");

    Ok(Json(MSG_ACCOUNT_UPDATED))
}

/// DELETE /account/{id} - remove an account.
pub async fn delete_account(
    State(state): State<AppState>,
    AccountIdPath(id): AccountIdPath,
) -> Result<Json<&'static str>, ApiError> {
    state.storage.delete_account(id).await?;
    info!(id, "Account deleted");
    Ok(Json(MSG_ACCOUNT_DELETED))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if the database answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.ping().await {
        Ok(()) => (StatusCode::OK, Json(ReadyResponse { ready: true })),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse { ready: false }),
            )
        }
    }
}

/// Metrics handler - Prometheus text exposition.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::from("metrics recorder not installed")),
    }
}
