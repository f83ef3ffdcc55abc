//! Brale Core Library
//!
//! Shared types, API models, and credential loading for the Brale API client.

pub mod api;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    default_cli_config_path, default_env_file_path, load_env_file, CredentialSources, EnvFile,
};
pub use error::*;
pub use types::*;
