//! Core types and data structures for the Brale client

use crate::error::{BraleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the OAuth2 client identifier
pub const CLIENT_ID_VAR: &str = "BRALE_CLIENT_ID";

/// Environment variable holding the OAuth2 client secret
pub const CLIENT_SECRET_VAR: &str = "BRALE_SECRET";

/// Default base URL of the Brale REST API
pub const DEFAULT_API_BASE_URL: &str = "https://api.brale.xyz";

/// Default base URL of the Brale authorization server
pub const DEFAULT_AUTH_BASE_URL: &str = "https://auth.brale.xyz";

/// OAuth2 client credentials.
///
/// Lives only for the duration of the process and is never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Build credentials, rejecting empty values.
    ///
    /// The error names every missing field.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        let mut missing = Vec::new();
        if client_id.trim().is_empty() {
            missing.push(CLIENT_ID_VAR);
        }
        if client_secret.trim().is_empty() {
            missing.push(CLIENT_SECRET_VAR);
        }
        if !missing.is_empty() {
            return Err(BraleError::config_invalid(missing));
        }

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token, treated as valid for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token string. Empty tokens are rejected.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} bytes>)", self.0.len())
    }
}

/// Identifier of an account within the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account id. Empty or blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fiat rail funding a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferSource {
    Wire,
    Ach,
}

impl TransferSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferSource::Wire => "wire",
            TransferSource::Ach => "ach",
        }
    }
}

impl fmt::Display for TransferSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a transfer amount given as a decimal string.
///
/// Accepts values like `10` or `25.50`; rejects zero, negatives, exponents
/// and more than two fractional digits.
pub fn validate_amount(amount: &str) -> Result<()> {
    let amount = amount.trim();
    let invalid = || BraleError::InvalidInput(format!("Invalid amount '{}'", amount));

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
    }

    let nonzero = amount.chars().any(|c| c.is_ascii_digit() && c != '0');
    if !nonzero {
        return Err(BraleError::InvalidInput(
            "Amount must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
