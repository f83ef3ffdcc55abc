//! Error types for the Brale client

use thiserror::Error;

/// Core error type for Brale operations
#[derive(Error, Debug)]
pub enum BraleError {
    /// The environment file holding the client credentials does not exist
    #[error("Environment file not found: {0}")]
    ConfigMissing(String),

    /// Required configuration values are absent or empty
    #[error("Missing required configuration: {}", .missing.join(", "))]
    ConfigInvalid { missing: Vec<String> },

    /// The token request failed or returned no token.
    ///
    /// `status` is `None` when the request never got a response.
    #[error("Authentication failed{}: {body}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    AuthFailed { status: Option<u16>, body: String },

    /// A resource could not be resolved from an API response.
    ///
    /// `status` carries the HTTP status when the failing call got a response.
    #[error("Resource unavailable{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    ResourceFailed { status: Option<u16>, message: String },

    /// Non-success HTTP status from an API endpoint
    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// Transport-level failure (DNS, connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Brale operations
pub type Result<T> = std::result::Result<T, BraleError>;

impl BraleError {
    /// Build a `ConfigInvalid` error from field names.
    pub fn config_invalid<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BraleError::ConfigInvalid {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a `ResourceFailed` error with no HTTP status.
    pub fn resource_failed(message: impl Into<String>) -> Self {
        BraleError::ResourceFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Whether a later attempt of the same request could succeed.
    ///
    /// Transport failures and 5xx responses are transient, including those
    /// from the token endpoint. 4xx responses and local errors are not.
    pub fn is_retriable(&self) -> bool {
        match self {
            BraleError::Network(_) => true,
            BraleError::Http { status, .. } => *status >= 500,
            BraleError::AuthFailed { status, .. } => status.map_or(true, |s| s >= 500),
            BraleError::ResourceFailed { status, .. } => status.map_or(false, |s| s >= 500),
            _ => false,
        }
    }

    /// Whether this is a 4xx response (client or credential error).
    pub fn is_client_error(&self) -> bool {
        match self {
            BraleError::Http { status, .. } => (400..500).contains(status),
            BraleError::AuthFailed { status, .. } | BraleError::ResourceFailed { status, .. } => {
                status.map_or(false, |s| (400..500).contains(&s))
            }
            _ => false,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BraleError::ConfigMissing(_) | BraleError::ConfigInvalid { .. } => 2,
            BraleError::AuthFailed { .. } => 3,
            BraleError::ResourceFailed {
                status: Some(status),
                ..
            } if *status >= 500 => 5,
            BraleError::ResourceFailed { .. } => 4,
            BraleError::Http { status, .. } if *status < 500 => 4,
            BraleError::Http { .. } | BraleError::Network(_) => 5,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for BraleError {
    fn from(err: serde_json::Error) -> Self {
        BraleError::Serialization(err.to_string())
    }
}
