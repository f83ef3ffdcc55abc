//! OAuth2 client-credentials token acquisition.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use brale_core::api::TokenResponse;
use brale_core::{AccessToken, BraleError, Credentials, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::debug;

/// Path of the token endpoint on the authorization server
pub const TOKEN_PATH: &str = "/oauth2/token";

/// `Authorization` header value for the token request.
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Exchange client credentials for a bearer token.
///
/// Sends a single form-encoded `grant_type=client_credentials` request.
/// Transport failures, non-success statuses and bodies without a usable
/// `access_token` all fail with `AuthFailed`, carrying the raw response body.
pub async fn fetch_token(
    client: &Client,
    auth_base_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken> {
    let url = format!("{}{}", auth_base_url.trim_end_matches('/'), TOKEN_PATH);
    debug!(url = %url, client_id = %credentials.client_id, "Requesting access token");

    let response = client
        .post(&url)
        .header(AUTHORIZATION, basic_auth_header(credentials))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| BraleError::AuthFailed {
            status: None,
            body: e.to_string(),
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| BraleError::AuthFailed {
        status: Some(status.as_u16()),
        body: e.to_string(),
    })?;

    if !status.is_success() {
        return Err(BraleError::AuthFailed {
            status: Some(status.as_u16()),
            body,
        });
    }

    let token = parse_token_response(status.as_u16(), &body)?;
    debug!("Access token acquired");
    Ok(token)
}

/// Extract the bearer token from a token endpoint response body.
pub fn parse_token_response(status: u16, body: &str) -> Result<AccessToken> {
    serde_json::from_str::<TokenResponse>(body)
        .ok()
        .and_then(|response| response.access_token)
        .and_then(AccessToken::new)
        .ok_or_else(|| BraleError::AuthFailed {
            status: Some(status),
            body: body.to_string(),
        })
}
