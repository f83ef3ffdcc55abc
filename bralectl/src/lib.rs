//! Brale CLI Library
//!
//! This library provides the core functionality for the `bralectl` tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::BraleClient`], an authenticated
//! client for the Brale REST API, and [`walk::walk`], which runs the
//! credentials → token → first account → addresses sequence. Configuration
//! types are available via [`config::CliConfig`] and [`config::ConfigBuilder`].
//!
//! ```no_run
//! use bralectl::client::ClientSettings;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = ClientSettings::new("https://api.brale.xyz", "https://auth.brale.xyz");
//! let outcome = bralectl::walk::walk(&settings, Path::new(".env")).await?;
//! println!("{}", outcome.addresses);
//! # Ok(())
//! # }
//! ```

/// OAuth2 client-credentials token acquisition.
pub mod auth;

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the Brale API.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

/// The credential → token → account → addresses walk.
pub mod walk;

#[cfg(test)]
pub mod test_utils;
