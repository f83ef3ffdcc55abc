//! Test utilities for CLI testing
//!
//! Provides a mock of the Brale authorization server and REST API. Both are
//! served from the same address, so the returned URL works as the API base
//! URL and as the auth base URL.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use brale_core::api::{Automation, CreateAutomationRequest, CreateTransferRequest, Transfer};
use brale_core::api::{TransferSourceLeg, WireInstructions};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Client id accepted by the mock token endpoint
pub const MOCK_CLIENT_ID: &str = "client";
/// Client secret accepted by the mock token endpoint
pub const MOCK_CLIENT_SECRET: &str = "secret";

/// What the token endpoint received
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub authorization: String,
    pub content_type: String,
    pub body: String,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    token: Arc<Mutex<String>>,
    /// Account ids returned by `/accounts`
    pub accounts: Arc<Mutex<Vec<String>>>,
    /// Raw body returned by `/accounts/{id}/addresses`
    pub addresses_body: Arc<Mutex<String>>,
    pub transfers: Arc<Mutex<Vec<Transfer>>>,
    pub automations: Arc<Mutex<Vec<Automation>>>,
    /// Number of upcoming API requests to fail with `fail_status`
    pub fail_next: Arc<Mutex<u32>>,
    pub fail_status: Arc<Mutex<StatusCode>>,
    /// Request paths seen by the API routes, in order
    pub requests: Arc<Mutex<Vec<String>>>,
    pub token_requests: Arc<Mutex<Vec<TokenRequest>>>,
    pub idempotency_keys: Arc<Mutex<Vec<String>>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        let addresses = serde_json::json!({
            "addresses": [
                {
                    "id": "addr_pending",
                    "status": "pending",
                    "type": "externally-owned",
                    "transfer_types": ["ethereum"]
                },
                {
                    "id": "addr_evm",
                    "status": "active",
                    "type": "internal",
                    "name": "Treasury",
                    "address": "0x1111111111111111111111111111111111111111",
                    "created": "2024-01-01T00:00:00Z",
                    "transfer_types": ["base", "ethereum"]
                },
                {
                    "id": "addr_sol",
                    "status": "active",
                    "type": "internal",
                    "address": "So1ana1111111111111111111111111111111111111",
                    "transfer_types": ["solana"]
                }
            ]
        });

        let transfer = Transfer {
            id: "tr_seed".to_string(),
            status: "complete".to_string(),
            amount: Some(brale_core::api::Amount {
                value: "100".to_string(),
                currency: "USD".to_string(),
            }),
            source: Some(TransferSourceLeg {
                value_type: "USD".to_string(),
                transfer_type: "wire".to_string(),
            }),
            destination: None,
            created_at: Some("2024-01-02T00:00:00Z".to_string()),
            updated_at: None,
            note: None,
            wire_instructions: None,
            ach_instructions: None,
        };

        Self {
            token: Arc::new(Mutex::new("tok_mock".to_string())),
            accounts: Arc::new(Mutex::new(vec!["acct_1".to_string(), "acct_2".to_string()])),
            addresses_body: Arc::new(Mutex::new(addresses.to_string())),
            transfers: Arc::new(Mutex::new(vec![transfer])),
            automations: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(0)),
            fail_status: Arc::new(Mutex::new(StatusCode::SERVICE_UNAVAILABLE)),
            requests: Arc::new(Mutex::new(Vec::new())),
            token_requests: Arc::new(Mutex::new(Vec::new())),
            idempotency_keys: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockServerState {
    /// Token handed out by the token endpoint
    pub fn token(&self) -> String {
        self.token.lock().unwrap().clone()
    }

    pub fn set_token(&self, token: &str) {
        *self.token.lock().unwrap() = token.to_string();
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        *self.accounts.lock().unwrap() = accounts.iter().map(|a| a.to_string()).collect();
    }

    pub fn set_addresses_body(&self, body: &str) {
        *self.addresses_body.lock().unwrap() = body.to_string();
    }

    pub fn fail_next(&self, count: u32) {
        self.fail_next_with(count, StatusCode::SERVICE_UNAVAILABLE);
    }

    pub fn fail_next_with(&self, count: u32, status: StatusCode) {
        *self.fail_status.lock().unwrap() = status;
        *self.fail_next.lock().unwrap() = count;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_token_request(&self) -> Option<TokenRequest> {
        self.token_requests.lock().unwrap().last().cloned()
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Start the mock server and return the base URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
        }

        Ok((self, server_url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/oauth2/token", post(token_handler))
            .route("/accounts", get(accounts_handler))
            .route("/accounts/:account/addresses", get(addresses_handler))
            .route(
                "/accounts/:account/transfers",
                get(list_transfers_handler).post(create_transfer_handler),
            )
            .route("/accounts/:account/transfers/:id", get(get_transfer_handler))
            .route(
                "/accounts/:account/automations",
                get(list_automations_handler).post(create_automation_handler),
            )
            .route(
                "/accounts/:account/automations/:id",
                get(get_automation_handler),
            )
            .with_state(self.state.clone())
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    json_response(status, serde_json::json!({ "error": message }).to_string())
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Common gate for API routes: records the path, injects failures, checks the
/// bearer token and the account id.
fn check_request(
    state: &MockServerState,
    headers: &HeaderMap,
    path: String,
    account: Option<&str>,
) -> std::result::Result<(), Response> {
    state.requests.lock().unwrap().push(path);

    {
        let mut fail_next = state.fail_next.lock().unwrap();
        if *fail_next > 0 {
            *fail_next -= 1;
            let status = *state.fail_status.lock().unwrap();
            return Err(error_response(status, "injected failure"));
        }
    }

    let expected = format!("Bearer {}", state.token());
    if header_value(headers, header::AUTHORIZATION) != expected {
        return Err(error_response(StatusCode::UNAUTHORIZED, "invalid token"));
    }

    if let Some(account) = account {
        if !state.accounts.lock().unwrap().iter().any(|a| a == account) {
            return Err(error_response(StatusCode::NOT_FOUND, "account not found"));
        }
    }

    Ok(())
}

/// Gate for POST routes. The idempotency key is recorded before failure
/// injection so retried attempts show up too.
fn check_create_request(
    state: &MockServerState,
    headers: &HeaderMap,
    path: String,
    account: &str,
) -> std::result::Result<(), Response> {
    let key = header_value(headers, header::HeaderName::from_static("idempotency-key"));
    if !key.is_empty() {
        state.idempotency_keys.lock().unwrap().push(key.clone());
    }

    check_request(state, headers, path, Some(account))?;

    if key.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "missing Idempotency-Key",
        ));
    }
    Ok(())
}

async fn token_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request = TokenRequest {
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body,
    };
    state.token_requests.lock().unwrap().push(request.clone());

    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", MOCK_CLIENT_ID, MOCK_CLIENT_SECRET))
    );
    if request.authorization != expected {
        return error_response(StatusCode::UNAUTHORIZED, "invalid_client");
    }
    if request.body != "grant_type=client_credentials" {
        return error_response(StatusCode::BAD_REQUEST, "unsupported_grant_type");
    }

    let token = state.token();
    if token.is_empty() {
        // Successful status without a token
        return json_response(StatusCode::OK, r#"{"token_type":"Bearer"}"#.to_string());
    }

    json_response(
        StatusCode::OK,
        serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 3600
        })
        .to_string(),
    )
}

async fn accounts_handler(State(state): State<MockServerState>, headers: HeaderMap) -> Response {
    if let Err(response) = check_request(&state, &headers, "/accounts".to_string(), None) {
        return response;
    }

    let accounts = state.accounts.lock().unwrap().clone();
    json_response(
        StatusCode::OK,
        serde_json::json!({ "accounts": accounts }).to_string(),
    )
}

async fn addresses_handler(
    Path(account): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/accounts/{}/addresses", account);
    if let Err(response) = check_request(&state, &headers, path, Some(&account)) {
        return response;
    }

    let body = state.addresses_body.lock().unwrap().clone();
    json_response(StatusCode::OK, body)
}

async fn list_transfers_handler(
    Path(account): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/accounts/{}/transfers", account);
    if let Err(response) = check_request(&state, &headers, path, Some(&account)) {
        return response;
    }

    let transfers = state.transfers.lock().unwrap().clone();
    json_response(
        StatusCode::OK,
        serde_json::json!({ "transfers": transfers }).to_string(),
    )
}

async fn get_transfer_handler(
    Path((account, id)): Path<(String, String)>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/accounts/{}/transfers/{}", account, id);
    if let Err(response) = check_request(&state, &headers, path, Some(&account)) {
        return response;
    }

    let transfers = state.transfers.lock().unwrap();
    match transfers.iter().find(|t| t.id == id) {
        Some(transfer) => json_response(StatusCode::OK, serde_json::to_string(transfer).unwrap()),
        None => error_response(StatusCode::NOT_FOUND, "transfer not found"),
    }
}

async fn create_transfer_handler(
    Path(account): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(request): Json<CreateTransferRequest>,
) -> Response {
    let path = format!("/accounts/{}/transfers", account);
    if let Err(response) = check_create_request(&state, &headers, path, &account) {
        return response;
    }

    let mut transfers = state.transfers.lock().unwrap();
    let wire_instructions = (request.source.transfer_type == "wire").then(|| WireInstructions {
        bank_name: Some("Mock Bank".to_string()),
        account_number: Some("000123456789".to_string()),
        routing_number: Some("021000021".to_string()),
        memo: Some(format!("BRALE-{}", transfers.len() + 1)),
        ..Default::default()
    });
    let ach_instructions = (request.source.transfer_type == "ach").then(|| {
        brale_core::api::AchInstructions {
            account_number: Some("000987654321".to_string()),
            routing_number: Some("021000021".to_string()),
            account_name: Some("Brale Mock".to_string()),
        }
    });

    let transfer = Transfer {
        id: format!("tr_{}", transfers.len() + 1),
        status: "pending".to_string(),
        amount: Some(request.amount),
        source: Some(request.source),
        destination: Some(request.destination),
        created_at: Some("2024-02-01T00:00:00Z".to_string()),
        updated_at: None,
        note: None,
        wire_instructions,
        ach_instructions,
    };
    transfers.push(transfer.clone());

    json_response(
        StatusCode::CREATED,
        serde_json::to_string(&transfer).unwrap(),
    )
}

async fn list_automations_handler(
    Path(account): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/accounts/{}/automations", account);
    if let Err(response) = check_request(&state, &headers, path, Some(&account)) {
        return response;
    }

    let automations = state.automations.lock().unwrap().clone();
    json_response(
        StatusCode::OK,
        serde_json::json!({ "automations": automations }).to_string(),
    )
}

async fn get_automation_handler(
    Path((account, id)): Path<(String, String)>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/accounts/{}/automations/{}", account, id);
    if let Err(response) = check_request(&state, &headers, path, Some(&account)) {
        return response;
    }

    let automations = state.automations.lock().unwrap();
    match automations.iter().find(|a| a.id == id) {
        Some(automation) => {
            json_response(StatusCode::OK, serde_json::to_string(automation).unwrap())
        }
        None => error_response(StatusCode::NOT_FOUND, "automation not found"),
    }
}

async fn create_automation_handler(
    Path(account): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(request): Json<CreateAutomationRequest>,
) -> Response {
    let path = format!("/accounts/{}/automations", account);
    if let Err(response) = check_create_request(&state, &headers, path, &account) {
        return response;
    }

    let mut automations = state.automations.lock().unwrap();
    let automation = Automation {
        id: format!("auto_{}", automations.len() + 1),
        name: Some(request.name),
        status: "active".to_string(),
        destination: Some(request.destination),
        created_at: Some("2024-03-01T00:00:00Z".to_string()),
        updated_at: None,
        wire_instructions: Some(WireInstructions {
            bank_name: Some("Mock Bank".to_string()),
            account_number: Some("000555555555".to_string()),
            routing_number: Some("021000021".to_string()),
            ..Default::default()
        }),
    };
    automations.push(automation.clone());

    json_response(StatusCode::OK, serde_json::to_string(&automation).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let (server, url) = MockServer::new().start().await.unwrap();
        assert!(server.port() > 0);
        assert!(url.starts_with("http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_mock_server_requires_bearer() {
        let (_server, url) = MockServer::new().start().await.unwrap();

        let response = reqwest::get(format!("{}/accounts", url)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }
}
