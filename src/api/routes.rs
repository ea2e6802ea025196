//! HTTP API route definitions.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_account, delete_account, get_account, get_accounts, health, init_db, ready,
    render_metrics, update_account, AppState,
};
use crate::metrics;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Account endpoints
        .route("/init", get(init_db))
        .route("/account", post(create_account))
        .route("/accounts", get(get_accounts))
        .route(
            "/account/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        // Operational endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(render_metrics))
        .route_layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Count and time every routed request.
async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_http_request(&method, &route, response.status().as_u16(), start);
    response
}
