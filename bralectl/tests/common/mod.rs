//! Minimal in-process Brale API for integration tests.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// base64("client:secret")
pub const BASIC_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

#[derive(Clone)]
struct ApiState {
    token_body: String,
    bearer: String,
    accounts: Vec<String>,
    addresses_body: String,
    hits: Arc<Mutex<Vec<String>>>,
}

/// A running test API; token and REST routes share one base URL.
pub struct TestApi {
    pub url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl TestApi {
    /// Paths requested so far, token endpoint included
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Builder for the test API responses.
pub struct TestApiBuilder {
    token_body: String,
    bearer: String,
    accounts: Vec<String>,
    addresses_body: String,
}

impl Default for TestApiBuilder {
    fn default() -> Self {
        Self {
            token_body: r#"{"access_token":"tok_xyz","token_type":"Bearer"}"#.to_string(),
            bearer: "tok_xyz".to_string(),
            accounts: vec!["acct_9".to_string()],
            addresses_body: r#"{"addresses":[{"id":"addr_1","status":"active","type":"internal","transfer_types":["base"]}]}"#.to_string(),
        }
    }
}

impl TestApiBuilder {
    pub fn token_body(mut self, body: &str) -> Self {
        self.token_body = body.to_string();
        self
    }

    /// Bearer token the REST routes accept
    pub fn expect_bearer(mut self, token: &str) -> Self {
        self.bearer = token.to_string();
        self
    }

    pub fn accounts(mut self, accounts: &[&str]) -> Self {
        self.accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn addresses_body(mut self, body: &str) -> Self {
        self.addresses_body = body.to_string();
        self
    }

    pub async fn spawn(self) -> TestApi {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = ApiState {
            token_body: self.token_body,
            bearer: format!("Bearer {}", self.bearer),
            accounts: self.accounts,
            addresses_body: self.addresses_body,
            hits: hits.clone(),
        };

        let app = Router::new()
            .route("/oauth2/token", post(token))
            .route("/accounts", get(accounts))
            .route("/accounts/:id/addresses", get(addresses))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestApi { url, hits }
    }
}

fn json(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn authorization(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn token(State(state): State<ApiState>, headers: HeaderMap, body: String) -> Response {
    state.hits.lock().unwrap().push("/oauth2/token".to_string());
    if authorization(&headers) != BASIC_AUTH || body != "grant_type=client_credentials" {
        return json(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_client"}"#.to_string(),
        );
    }
    json(StatusCode::OK, state.token_body.clone())
}

async fn accounts(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    state.hits.lock().unwrap().push("/accounts".to_string());
    if authorization(&headers) != state.bearer {
        return json(StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized"}"#.to_string());
    }
    json(
        StatusCode::OK,
        serde_json::json!({ "accounts": state.accounts }).to_string(),
    )
}

async fn addresses(
    Path(id): Path<String>,
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Response {
    state
        .hits
        .lock()
        .unwrap()
        .push(format!("/accounts/{}/addresses", id));
    if authorization(&headers) != state.bearer {
        return json(StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized"}"#.to_string());
    }
    json(StatusCode::OK, state.addresses_body.clone())
}

/// Write an env file with the given contents into `dir`.
pub fn write_env_file(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join(".env");
    std::fs::write(&path, contents).unwrap();
    path
}

pub const GOOD_ENV: &str = "BRALE_CLIENT_ID=client\nBRALE_SECRET=secret\n";
