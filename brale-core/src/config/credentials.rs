//! Client credential loading
//!
//! Credentials come from an environment file (`KEY=value` lines), the process
//! environment, or explicit values. Loading an environment file never touches
//! the process environment: the declared variables are collected into an
//! [`EnvFile`] and handed to whoever needs them.

use crate::error::{BraleError, Result};
use crate::types::{Credentials, CLIENT_ID_VAR, CLIENT_SECRET_VAR};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Variables declared by an environment file.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    path: PathBuf,
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Path the variables were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Extract and validate the client credentials.
    ///
    /// Fails with `ConfigInvalid` naming every missing or empty variable.
    pub fn credentials(&self) -> Result<Credentials> {
        let client_id = self.get(CLIENT_ID_VAR).unwrap_or_default();
        let client_secret = self.get(CLIENT_SECRET_VAR).unwrap_or_default();
        Credentials::new(client_id, client_secret)
    }
}

/// Read an environment file into an [`EnvFile`].
///
/// Fails with `ConfigMissing` if the file does not exist.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<EnvFile> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(BraleError::ConfigMissing(path.display().to_string()));
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| env_file_error(path, e))?;

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_file_error(path, e))?;
        vars.insert(key, value);
    }

    Ok(EnvFile {
        path: path.to_path_buf(),
        vars,
    })
}

fn env_file_error(path: &Path, err: dotenvy::Error) -> BraleError {
    match err {
        dotenvy::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            BraleError::ConfigMissing(path.display().to_string())
        }
        dotenvy::Error::Io(io) => BraleError::Io(io),
        other => BraleError::InvalidInput(format!(
            "Failed to parse environment file {}: {}",
            path.display(),
            other
        )),
    }
}

/// Layered credential sources for commands that accept several origins.
///
/// Lookup order per field: explicit value, process environment, environment
/// file. The environment file is optional here; a missing file is skipped.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub env_file: Option<PathBuf>,
}

impl CredentialSources {
    pub fn resolve(&self) -> Result<Credentials> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve with a custom process-environment lookup.
    pub fn resolve_with<F>(&self, env: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match &self.env_file {
            Some(path) => match load_env_file(path) {
                Ok(file) => Some(file),
                Err(BraleError::ConfigMissing(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let lookup = |explicit: &Option<String>, key: &str| -> String {
            explicit
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
                .or_else(|| file.as_ref().and_then(|f| f.get(key)).map(str::to_string))
                .unwrap_or_default()
        };

        Credentials::new(
            lookup(&self.client_id, CLIENT_ID_VAR),
            lookup(&self.client_secret, CLIENT_SECRET_VAR),
        )
    }
}
