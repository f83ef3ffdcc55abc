//! HTTP client for communicating with the Brale API.

use crate::auth;
use crate::config::CliConfig;
use brale_core::api::{
    AccountsResponse, Address, AddressesResponse, Automation, AutomationsResponse,
    CreateAutomationRequest, CreateTransferRequest, Transfer, TransfersResponse,
};
use brale_core::{AccessToken, AccountId, BraleError, Credentials, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the client-generated key that makes transfer creation safe
/// to retry.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Normalize a base URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> BraleError {
    BraleError::Network(format!("{}: {}", endpoint, err))
}

/// Failures of the accounts call itself count as an unresolved account.
fn accounts_call_failed(err: BraleError) -> BraleError {
    match err {
        BraleError::Http { status, body, .. } => BraleError::ResourceFailed {
            status: Some(status),
            message: format!("Accounts request failed: {}", body),
        },
        BraleError::Network(reason) => {
            BraleError::resource_failed(format!("Accounts request failed: {}", reason))
        }
        other => other,
    }
}

/// Connection settings shared by the token fetch and API calls.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub auth_base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts for retriable failures; 0 means a single attempt
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    pub retry_delay: Duration,
}

impl ClientSettings {
    pub fn new(api_base_url: impl Into<String>, auth_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            auth_base_url: auth_base_url.into(),
            timeout_secs: 30,
            max_retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self {
            timeout_secs: config.timeout,
            max_retries: config.max_retries,
            ..Self::new(&config.api_base_url, &config.auth_base_url)
        }
    }

    fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("bralectl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BraleError::Network(format!("Failed to create HTTP client: {}", e)))
    }
}

/// Run `op` until it succeeds, fails with a non-retriable error, or the
/// attempts run out.
///
/// Delay grows linearly: `retry_delay * attempt`.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    retry_delay: Duration,
    endpoint: &str,
    op: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if attempt < max_retries && e.is_retriable() => {
                attempt += 1;
                warn!(endpoint, attempt, error = %e, "Request failed, retrying");
                tokio::time::sleep(retry_delay * attempt).await;
            }
            result => return result,
        }
    }
}

/// Authenticated client for the Brale REST API.
///
/// A client always holds a bearer token: [`BraleClient::connect`] performs the
/// client-credentials exchange before any API call can be made.
///
/// # Examples
///
/// ```no_run
/// use bralectl::client::{BraleClient, ClientSettings};
/// use brale_core::Credentials;
///
/// # async fn example() -> anyhow::Result<()> {
/// let settings = ClientSettings::new("https://api.brale.xyz", "https://auth.brale.xyz");
/// let credentials = Credentials::new("client-id", "client-secret")?;
/// let client = BraleClient::connect(&settings, &credentials).await?;
///
/// let account = client.first_account().await?;
/// println!("{}", client.addresses_raw(&account).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BraleClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    token: AccessToken,
}

impl BraleClient {
    /// Acquire a token with `credentials` and build a client around it.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailed` if the token endpoint is unreachable, rejects the
    /// credentials, or answers without a token.
    pub async fn connect(settings: &ClientSettings, credentials: &Credentials) -> Result<Self> {
        let client = settings.http_client()?;
        let auth_base_url = normalize_url(&settings.auth_base_url);

        let http = &client;
        let auth_url = auth_base_url.as_str();
        let token = with_retry(
            settings.max_retries,
            settings.retry_delay,
            auth::TOKEN_PATH,
            move || auth::fetch_token(http, auth_url, credentials),
        )
        .await?;

        Ok(Self {
            client,
            base_url: normalize_url(&settings.api_base_url),
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
            token,
        })
    }

    /// Build a client around an already acquired token.
    pub fn with_token(settings: &ClientSettings, token: AccessToken) -> Result<Self> {
        Ok(Self {
            client: settings.http_client()?,
            base_url: normalize_url(&settings.api_base_url),
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
            token,
        })
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read a response body, turning non-success statuses into `Http` errors.
    async fn read_body(response: Response, endpoint: &str) -> Result<String> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        if !status.is_success() {
            return Err(BraleError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                body: text,
            });
        }

        debug!(endpoint, status = status.as_u16(), bytes = text.len(), "Response received");
        Ok(text)
    }

    fn parse_json<T: DeserializeOwned>(text: &str, endpoint: &str) -> Result<T> {
        serde_json::from_str(text).map_err(|e| {
            BraleError::Serialization(format!(
                "Failed to parse JSON response from {}: {}",
                endpoint, e
            ))
        })
    }

    /// Send an authenticated request with retry and return the raw body.
    async fn send_with_retry<F>(&self, endpoint: &str, request_fn: F) -> Result<String>
    where
        F: Fn() -> RequestBuilder,
    {
        with_retry(self.max_retries, self.retry_delay, endpoint, move || {
            let request = request_fn().bearer_auth(self.token.as_str());
            async move {
                let response = request
                    .send()
                    .await
                    .map_err(|e| transport_error(endpoint, e))?;
                Self::read_body(response, endpoint).await
            }
        })
        .await
    }

    async fn execute_with_retry<F, T>(&self, endpoint: &str, request_fn: F) -> Result<T>
    where
        F: Fn() -> RequestBuilder,
        T: DeserializeOwned,
    {
        let text = self.send_with_retry(endpoint, request_fn).await?;
        Self::parse_json(&text, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        self.execute_with_retry(path, || self.client.get(&url))
            .await
    }

    /// List the account ids visible to these credentials.
    pub async fn list_accounts(&self) -> Result<AccountsResponse> {
        self.get_json("/accounts").await
    }

    /// Resolve the first account returned by `/accounts`.
    ///
    /// # Errors
    ///
    /// Returns `ResourceFailed` if the accounts call fails, the response cannot
    /// be decoded, or it holds no usable account id. A failed call keeps its
    /// HTTP status, if any.
    pub async fn first_account(&self) -> Result<AccountId> {
        let endpoint = "/accounts";
        let url = self.url(endpoint);
        let text = self
            .send_with_retry(endpoint, || self.client.get(&url))
            .await
            .map_err(accounts_call_failed)?;

        let accounts: AccountsResponse = serde_json::from_str(&text).map_err(|e| {
            BraleError::resource_failed(format!("Could not decode accounts response: {}", e))
        })?;

        accounts
            .accounts
            .into_iter()
            .next()
            .and_then(AccountId::new)
            .ok_or_else(|| BraleError::resource_failed("No accounts returned"))
    }

    /// Fetch the addresses of `account` as the unmodified response body.
    pub async fn addresses_raw(&self, account: &AccountId) -> Result<String> {
        let endpoint = format!("/accounts/{}/addresses", account);
        let url = self.url(&endpoint);
        self.send_with_retry(&endpoint, || self.client.get(&url))
            .await
    }

    pub async fn list_addresses(&self, account: &AccountId) -> Result<AddressesResponse> {
        self.get_json(&format!("/accounts/{}/addresses", account))
            .await
    }

    /// Look up a single address in the account's address list.
    pub async fn get_address(&self, account: &AccountId, address_id: &str) -> Result<Address> {
        self.list_addresses(account)
            .await?
            .addresses
            .into_iter()
            .find(|addr| addr.id == address_id)
            .ok_or_else(|| {
                BraleError::resource_failed(format!(
                    "Address {} not found in account {}",
                    address_id, account
                ))
            })
    }

    pub async fn list_transfers(&self, account: &AccountId) -> Result<TransfersResponse> {
        self.get_json(&format!("/accounts/{}/transfers", account))
            .await
    }

    pub async fn get_transfer(&self, account: &AccountId, transfer_id: &str) -> Result<Transfer> {
        if transfer_id.trim().is_empty() {
            return Err(BraleError::InvalidInput(
                "Transfer id cannot be empty".to_string(),
            ));
        }

        self.get_json(&format!("/accounts/{}/transfers/{}", account, transfer_id))
            .await
    }

    /// Create a transfer.
    ///
    /// A fresh idempotency key is generated per call and reused across retry
    /// attempts of that call.
    pub async fn create_transfer(
        &self,
        account: &AccountId,
        request: &CreateTransferRequest,
    ) -> Result<Transfer> {
        let endpoint = format!("/accounts/{}/transfers", account);
        let url = self.url(&endpoint);
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        debug!(endpoint = %endpoint, idempotency_key = %idempotency_key, "Creating transfer");

        self.execute_with_retry(&endpoint, || {
            self.client
                .post(&url)
                .header(IDEMPOTENCY_KEY_HEADER, &idempotency_key)
                .json(request)
        })
        .await
    }

    pub async fn list_automations(&self, account: &AccountId) -> Result<AutomationsResponse> {
        self.get_json(&format!("/accounts/{}/automations", account))
            .await
    }

    pub async fn get_automation(
        &self,
        account: &AccountId,
        automation_id: &str,
    ) -> Result<Automation> {
        if automation_id.trim().is_empty() {
            return Err(BraleError::InvalidInput(
                "Automation id cannot be empty".to_string(),
            ));
        }

        self.get_json(&format!(
            "/accounts/{}/automations/{}",
            account, automation_id
        ))
        .await
    }

    /// Create an automation, with one idempotency key shared by all attempts.
    pub async fn create_automation(
        &self,
        account: &AccountId,
        request: &CreateAutomationRequest,
    ) -> Result<Automation> {
        let endpoint = format!("/accounts/{}/automations", account);
        let url = self.url(&endpoint);
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        debug!(endpoint = %endpoint, idempotency_key = %idempotency_key, "Creating automation");

        self.execute_with_retry(&endpoint, || {
            self.client
                .post(&url)
                .header(IDEMPOTENCY_KEY_HEADER, &idempotency_key)
                .json(request)
        })
        .await
    }
}
