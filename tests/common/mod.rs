#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, header},
};
use rental_portal::{
    AppConfig, AppState, Argon2Passwords, MemoryRepository, PasswordService,
    auth::{AdminPrincipal, CustomerPrincipal, Principal},
    models::{Admin, Customer, NewCustomer},
    repository::{Repository, RepositoryState},
};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"test-session-secret-0123456789abcdef";
pub const CUSTOMER_EMAIL: &str = "driver@example.com";
pub const CUSTOMER_PASSWORD: &str = "road-trip-2024";
pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const ADMIN_PASSWORD: &str = "fleet-manager-99";

pub fn customer() -> Principal {
    Principal::Customer(CustomerPrincipal {
        id: Uuid::from_u128(1),
        email: CUSTOMER_EMAIL.to_string(),
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
    })
}

pub fn admin() -> Principal {
    Principal::Admin(AdminPrincipal {
        id: Uuid::from_u128(2),
        email: ADMIN_EMAIL.to_string(),
        username: "ops".to_string(),
    })
}

/// App state over a fresh in-memory repository, with the repository handle returned
/// separately so tests can seed it or take storage offline.
pub fn test_state() -> (AppState, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(repo.clone() as RepositoryState, AppConfig::default());
    (state, repo)
}

pub async fn seed_customer(repo: &MemoryRepository) -> Customer {
    let password_hash = Argon2Passwords.hash(CUSTOMER_PASSWORD).unwrap();
    repo.create_customer(NewCustomer {
        email: CUSTOMER_EMAIL.to_string(),
        password_hash,
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
    })
    .await
    .unwrap()
}

pub async fn seed_admin(repo: &MemoryRepository) -> Admin {
    let password_hash = Argon2Passwords.hash(ADMIN_PASSWORD).unwrap();
    repo.insert_admin(ADMIN_EMAIL, "ops", &password_hash).await
}

/// Request headers carrying `token` in the session cookie.
pub fn cookie_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session={token}")).unwrap(),
    );
    headers
}

/// The `name=value` pair of the response's `Set-Cookie` header, as a browser would
/// send it back.
pub fn returned_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
