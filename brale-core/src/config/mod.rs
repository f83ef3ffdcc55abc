//! Configuration support shared by Brale tools
//!
//! - [`credentials`] - Loading OAuth2 client credentials from an environment
//!   file, the process environment, or explicit values
//! - [`paths`] - Default locations for configuration files

mod credentials;
mod paths;

pub use credentials::{load_env_file, CredentialSources, EnvFile};
pub use paths::{default_cli_config_path, default_env_file_path};
