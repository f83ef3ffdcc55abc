//! The credential → token → account → addresses walk.
//!
//! Stages run strictly in order and any failure aborts the walk:
//!
//! ```text
//! Start → CredentialsLoaded → TokenAcquired → AccountResolved → AddressesFetched → Done
//!   └──────────────┴────────────────┴───────────────┴────────────────┴──→ Aborted
//! ```

use crate::client::{BraleClient, ClientSettings};
use brale_core::{load_env_file, AccountId, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    CredentialsLoaded,
    TokenAcquired,
    AccountResolved,
    AddressesFetched,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::CredentialsLoaded => "credentials_loaded",
            Stage::TokenAcquired => "token_acquired",
            Stage::AccountResolved => "account_resolved",
            Stage::AddressesFetched => "addresses_fetched",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Result of a completed walk
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// First account returned by `/accounts`
    pub account: AccountId,
    /// Body of `/accounts/{account}/addresses`, unmodified
    pub addresses: String,
}

/// Tracks the current stage of a walk.
#[derive(Debug)]
pub struct Walker {
    stage: Stage,
    failed_at: Option<Stage>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

impl Walker {
    pub fn new() -> Self {
        Self {
            stage: Stage::Start,
            failed_at: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Last stage reached before an abort, `None` unless the walk failed.
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = %self.stage, to = %next, "Walk stage");
        self.stage = next;
    }

    /// Run the walk against `settings`, reading credentials from `env_file`.
    ///
    /// On failure the walker ends in [`Stage::Aborted`] and
    /// [`Walker::failed_at`] holds the last stage it reached.
    pub async fn run(&mut self, settings: &ClientSettings, env_file: &Path) -> Result<WalkOutcome> {
        let result = self.run_stages(settings, env_file).await;
        match &result {
            Ok(_) => self.advance(Stage::Done),
            Err(e) => {
                debug!(stage = %self.stage, error = %e, "Walk aborted");
                self.failed_at = Some(self.stage);
                self.advance(Stage::Aborted);
            }
        }
        result
    }

    async fn run_stages(&mut self, settings: &ClientSettings, env_file: &Path) -> Result<WalkOutcome> {
        let credentials = load_env_file(env_file)?.credentials()?;
        info!(path = %env_file.display(), "Loaded credentials");
        self.advance(Stage::CredentialsLoaded);

        let client = BraleClient::connect(settings, &credentials).await?;
        info!("Access token acquired");
        self.advance(Stage::TokenAcquired);

        let account = client.first_account().await?;
        info!(account = %account, "Using first account");
        self.advance(Stage::AccountResolved);

        let addresses = client.addresses_raw(&account).await?;
        self.advance(Stage::AddressesFetched);

        Ok(WalkOutcome { account, addresses })
    }
}

/// Run a complete walk with a fresh [`Walker`].
pub async fn walk(settings: &ClientSettings, env_file: &Path) -> Result<WalkOutcome> {
    Walker::new().run(settings, env_file).await
}
