//! Default path resolution for configuration files
//!
//! Uses the platform configuration directory when available, with a fallback
//! to the working directory.

use std::path::PathBuf;

/// Returns the default path for the CLI configuration file.
///
/// - Linux: `~/.config/brale/cli.toml`
/// - macOS: `~/Library/Application Support/brale/cli.toml`
/// - Fallback: `./brale/cli.toml`
pub fn default_cli_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brale")
        .join("cli.toml")
}

/// Returns the default environment file holding the client credentials.
pub fn default_env_file_path() -> PathBuf {
    PathBuf::from(".env")
}
