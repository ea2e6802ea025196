//! Integration tests for the account API.
//!
//! The in-memory tests run everywhere. The PostgreSQL tests require a
//! DATABASE_URL environment variable.
//! Run with: cargo test --test integration -- --ignored

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use account_api::account::{Account, AccountRequest};
use account_api::api::{create_router, AppState};
use account_api::config::Config;
use account_api::server::bootstrap;
use account_api::storage::{MemoryStorage, Storage};
use account_api::StorageError;

fn memory_app() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (create_router(AppState::new(storage.clone())), storage)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn person(n: usize) -> Value {
    json!({
        "first_name": format!("First{n}"),
        "last_name": format!("Last{n}"),
        "email": format!("person{n}@x.com"),
        "phone_number": format!("555-{n:04}")
    })
}

/// Spec example: POST Ada, then GET /accounts holds exactly her record.
#[tokio::test]
async fn test_create_and_list_example() {
    let (app, _) = memory_app();

    let ada = json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@x.com",
        "phone_number": "555-0100"
    });
    let (status, body) = call(&app, Method::POST, "/account", Some(ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("account created successfully"));

    let (status, body) = call(&app, Method::GET, "/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    let matching: Vec<&Value> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["email"] == "ada@x.com")
        .collect();
    assert_eq!(matching.len(), 1);
    assert!(!matching[0]["account_number"].as_str().unwrap().is_empty());
    assert!(matching[0]["created_at"].is_string());
}

/// Listing after N creations returns all N, each with a distinct account number.
#[tokio::test]
async fn test_list_contains_all_created() {
    let (app, _) = memory_app();
    const N: usize = 5;

    for n in 0..N {
        let (status, _) = call(&app, Method::POST, "/account", Some(person(n))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = call(&app, Method::GET, "/accounts", None).await;
    let accounts = body.as_array().unwrap();
    assert!(accounts.len() >= N);

    let emails: HashSet<&str> = accounts.iter().map(|a| a["email"].as_str().unwrap()).collect();
    for n in 0..N {
        assert!(emails.contains(format!("person{n}@x.com").as_str()));
    }

    let numbers: HashSet<&str> = accounts
        .iter()
        .map(|a| a["account_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers.len(), accounts.len());
}

/// Empty table lists as an empty array, not an error.
#[tokio::test]
async fn test_empty_list() {
    let (app, _) = memory_app();
    let (status, body) = call(&app, Method::GET, "/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

/// Fetching an ID that was never created is a 404.
#[tokio::test]
async fn test_get_unknown_id() {
    let (app, _) = memory_app();
    let (status, body) = call(&app, Method::GET, "/account/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(body["error"].as_str().unwrap().contains("12345"));
}

/// Update and delete of unknown IDs succeed silently.
#[tokio::test]
async fn test_update_and_delete_unknown_id_succeed() {
    let (app, storage) = memory_app();

    let (status, _) = call(&app, Method::PUT, "/account/77", Some(person(1))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, "/account/77", None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(storage.is_empty());
}

/// Update reflects all four fields; delete removes the record.
#[tokio::test]
async fn test_update_then_delete_lifecycle() {
    let (app, storage) = memory_app();
    call(&app, Method::POST, "/account", Some(person(1))).await;
    let original = storage.get_account(1).await.unwrap();

    let (status, _) = call(&app, Method::PUT, "/account/1", Some(person(2))).await;
    assert_eq!(status, StatusCode::OK);

    let updated = storage.get_account(1).await.unwrap();
    assert_eq!(updated.first_name, "First2");
    assert_eq!(updated.last_name, "Last2");
    assert_eq!(updated.email, "person2@x.com");
    assert_eq!(updated.phone_number, "555-0002");
    assert_eq!(updated.account_number, original.account_number);

    let (status, _) = call(&app, Method::DELETE, "/account/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/account/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A non-numeric id on PUT is rejected rather than silently ignored.
#[tokio::test]
async fn test_update_with_bad_id_is_rejected() {
    let (app, storage) = memory_app();
    call(&app, Method::POST, "/account", Some(person(1))).await;

    let (status, body) = call(&app, Method::PUT, "/account/one", Some(person(2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let unchanged = storage.get_account(1).await.unwrap();
    assert_eq!(unchanged.email, "person1@x.com");
}

/// Same email twice is a conflict; the second record is not stored.
#[tokio::test]
async fn test_duplicate_email_conflict() {
    let (app, storage) = memory_app();
    call(&app, Method::POST, "/account", Some(person(1))).await;

    let mut twin = person(2);
    twin["email"] = json!("person1@x.com");
    let (status, body) = call(&app, Method::POST, "/account", Some(twin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
    assert_eq!(storage.len(), 1);
}

/// A phone number wider than its column is rejected on update, and the row is untouched.
#[tokio::test]
async fn test_overlong_phone_on_update_is_validation() {
    let (app, storage) = memory_app();
    call(&app, Method::POST, "/account", Some(person(1))).await;

    let mut wide = person(1);
    wide["phone_number"] = json!("5".repeat(51));
    let (status, body) = call(&app, Method::PUT, "/account/1", Some(wide)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let unchanged = storage.get_account(1).await.unwrap();
    assert_eq!(unchanged.phone_number, "555-0001");
}

/// Request body without a JSON content type is a validation error.
#[tokio::test]
async fn test_missing_content_type_is_validation() {
    let (app, _) = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/account")
        .body(Body::from(person(1).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Startup refuses an invalid configuration without touching the network.
#[tokio::test]
async fn test_bootstrap_rejects_bad_config() {
    let config = Config {
        database_url: String::new(),
        db_max_connections: 10,
        db_min_connections: 5,
        listen_addr: ":3000".to_string(),
    };
    assert!(bootstrap(&config).await.is_err());
}

/// Get a test config from environment.
fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    Some(Config {
        database_url,
        db_max_connections: 2,
        db_min_connections: 0,
        listen_addr: "127.0.0.1:0".to_string(),
    })
}

fn unique_request(tag: &str) -> AccountRequest {
    let suffix = account_api::account::generate_account_number();
    AccountRequest {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: format!("{tag}-{suffix}@x.com"),
        phone_number: format!("{tag}-{suffix}"),
    }
}

/// Full CRUD cycle through the router against PostgreSQL.
#[tokio::test]
#[ignore = "requires database"]
async fn test_postgres_crud_cycle() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DATABASE_URL not set");
            return;
        }
    };

    let state = bootstrap(&config).await.expect("bootstrap failed");
    let storage = state.storage.clone();
    let app = create_router(state);

    let (status, _) = call(&app, Method::GET, "/init", None).await;
    assert_eq!(status, StatusCode::OK);

    let account = Account::from(unique_request("it-crud"));
    let id = storage.create_account(&account).await.unwrap();

    let (status, body) = call(&app, Method::GET, &format!("/account/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], account.email.as_str());
    assert_eq!(body["account_number"], account.account_number.as_str());

    let update = unique_request("it-crud-upd");
    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/account/{id}"),
        Some(serde_json::to_value(&update).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fetched = storage.get_account(id).await.unwrap();
    assert_eq!(fetched.email, update.email);
    assert_eq!(fetched.account_number, account.account_number);

    let (status, _) = call(&app, Method::DELETE, &format!("/account/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let err = storage.get_account(id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

/// Unique phone numbers are enforced by PostgreSQL.
#[tokio::test]
#[ignore = "requires database"]
async fn test_postgres_duplicate_phone_conflict() {
    let Some(config) = test_config() else {
        println!("Skipping: DATABASE_URL not set");
        return;
    };

    let state = bootstrap(&config).await.expect("bootstrap failed");
    state.storage.init_db().await.unwrap();

    let first = Account::from(unique_request("it-dup"));
    let id = state.storage.create_account(&first).await.unwrap();

    let mut second = Account::from(unique_request("it-dup2"));
    second.phone_number = first.phone_number.clone();
    let err = state.storage.create_account(&second).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)), "got {err:?}");

    state.storage.delete_account(id).await.unwrap();
}
