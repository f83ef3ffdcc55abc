//! API models for the Brale REST API
//!
//! Request and response bodies for the token, accounts, addresses, transfers
//! and automations endpoints. Unknown fields are ignored on decode so new
//! server-side fields do not break the client.

use crate::types::TransferSource;
use serde::{Deserialize, Serialize};

/// Token endpoint response (OAuth2 client-credentials grant)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token; absent when the server refuses the grant
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token type, normally "Bearer"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Accounts list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsResponse {
    /// Account identifiers, in server order
    #[serde(default)]
    pub accounts: Vec<String>,
}

/// A custodial or external address attached to an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub status: String,
    /// "internal" or "externally-owned"
    #[serde(rename = "type", default)]
    pub address_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// On-chain address, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Networks this address can receive on (e.g. "base", "solana")
    #[serde(default)]
    pub transfer_types: Vec<String>,
}

impl Address {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn supports(&self, network: &str) -> bool {
        self.transfer_types.iter().any(|t| t == network)
    }
}

/// Addresses list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressesResponse {
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl AddressesResponse {
    /// Find a destination address for a transfer or automation.
    ///
    /// With a network, the first active address supporting it is chosen.
    /// Without one, the first active address with any transfer type is
    /// chosen together with its first transfer type.
    pub fn find_compatible(&self, network: Option<&str>) -> Option<(&Address, String)> {
        self.addresses
            .iter()
            .filter(|addr| addr.is_active())
            .find_map(|addr| match network {
                Some(network) if addr.supports(network) => Some((addr, network.to_string())),
                Some(_) => None,
                None => addr.transfer_types.first().map(|t| (addr, t.clone())),
            })
    }

    /// Networks reachable through active addresses, sorted and deduplicated.
    pub fn available_networks(&self) -> Vec<String> {
        let mut networks: Vec<String> = self
            .addresses
            .iter()
            .filter(|addr| addr.is_active())
            .flat_map(|addr| addr.transfer_types.iter().cloned())
            .collect();
        networks.sort();
        networks.dedup();
        networks
    }
}

/// Monetary amount as sent by the API (value is a decimal string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(deserialize_with = "deserialize_decimal")]
    pub value: String,
    pub currency: String,
}

/// Source leg of a transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSourceLeg {
    pub value_type: String,
    pub transfer_type: String,
}

/// Destination leg of a transfer or automation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    pub value_type: String,
    pub transfer_type: String,
}

/// Wire deposit instructions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireInstructions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// ACH deposit instructions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchInstructions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

/// A transfer between a fiat rail and a token destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TransferSourceLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_instructions: Option<WireInstructions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ach_instructions: Option<AchInstructions>,
}

/// Transfers list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransfersResponse {
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// Transfer creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    pub amount: Amount,
    pub source: TransferSourceLeg,
    pub destination: Destination,
}

impl CreateTransferRequest {
    /// Fund `amount` USD over `source` into `token` on `network` at `address_id`.
    pub fn new(
        amount: &str,
        source: TransferSource,
        token: &str,
        network: &str,
        address_id: &str,
    ) -> Self {
        Self {
            amount: Amount {
                value: amount.trim().to_string(),
                currency: "USD".to_string(),
            },
            source: TransferSourceLeg {
                value_type: "USD".to_string(),
                transfer_type: source.as_str().to_string(),
            },
            destination: Destination {
                address_id: Some(address_id.to_string()),
                value_type: token.to_uppercase(),
                transfer_type: network.to_string(),
            },
        }
    }
}

/// A standing fiat-to-token automation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_instructions: Option<WireInstructions>,
}

/// Automations list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationsResponse {
    #[serde(default)]
    pub automations: Vec<Automation>,
}

/// Automation creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAutomationRequest {
    pub name: String,
    /// Funding currency, always "USD"
    #[serde(rename = "type")]
    pub funding_type: String,
    pub destination: Destination,
}

impl CreateAutomationRequest {
    pub fn new(name: &str, token: &str, network: &str, address_id: &str) -> Self {
        Self {
            name: name.to_string(),
            funding_type: "USD".to_string(),
            destination: Destination {
                address_id: Some(address_id.to_string()),
                value_type: token.to_uppercase(),
                transfer_type: network.to_string(),
            },
        }
    }
}

// Amount values arrive as strings, but accept bare numbers too
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}
