//! Command execution handlers

use anyhow::{Context, Result};
use brale_core::api::{AddressesResponse, CreateAutomationRequest, CreateTransferRequest};
use brale_core::{validate_amount, AccountId, BraleError, CredentialSources};
use std::path::Path;
use tracing::{debug, info};

use crate::client::{BraleClient, ClientSettings};
use crate::config::CliConfig;
use crate::format::{self, format_success, OutputFormat};
use crate::walk;

use super::commands::*;

/// Pick the account for an account-scoped command.
///
/// `--account` wins over the configured default. With neither, the command
/// cannot run.
pub fn resolve_account(
    flag: Option<&str>,
    default_account: Option<&str>,
) -> std::result::Result<AccountId, BraleError> {
    flag.and_then(AccountId::new)
        .or_else(|| default_account.and_then(AccountId::new))
        .ok_or_else(|| BraleError::config_invalid(["default_account"]))
}

/// Choose the destination address and network for a transfer or automation.
pub fn select_destination(
    addresses: &AddressesResponse,
    network: Option<&str>,
) -> std::result::Result<(String, String), BraleError> {
    let network = network.map(|n| n.trim().to_lowercase());

    match addresses.find_compatible(network.as_deref()) {
        Some((address, network)) => Ok((address.id.clone(), network)),
        None => {
            let available = addresses.available_networks();
            let wanted = network
                .map(|n| format!(" for network '{}'", n))
                .unwrap_or_default();
            Err(BraleError::resource_failed(format!(
                "No active address{}. Available networks: {}",
                wanted,
                if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                }
            )))
        }
    }
}

/// Keep items whose status matches `status`, case-insensitively.
pub fn filter_by_status<T, F>(items: Vec<T>, status: Option<&str>, status_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    match status {
        Some(wanted) => items
            .into_iter()
            .filter(|item| status_of(item).eq_ignore_ascii_case(wanted))
            .collect(),
        None => items,
    }
}

/// Handle the walk command: print the first account's addresses verbatim
pub async fn handle_walk(settings: &ClientSettings, env_file: &Path) -> Result<()> {
    let outcome = walk::walk(settings, env_file).await?;
    debug!(account = %outcome.account, "Walk complete");

    print!("{}", outcome.addresses);
    if !outcome.addresses.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Handle auth commands
pub async fn handle_auth(
    command: AuthCommands,
    settings: &ClientSettings,
    env_file: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        AuthCommands::Login {
            client_id,
            client_secret,
        } => {
            let sources = CredentialSources {
                client_id,
                client_secret,
                env_file: Some(env_file.to_path_buf()),
            };
            let credentials = sources.resolve()?;
            let client = BraleClient::connect(settings, &credentials).await?;
            let accounts = client.list_accounts().await?.accounts;

            println!(
                "{}",
                format_success(&format!(
                    "Authenticated as {} ({} account(s))",
                    credentials.client_id,
                    accounts.len()
                ))
            );

            if let [only] = accounts.as_slice() {
                match config_path {
                    Some(path) => {
                        let mut config = CliConfig::load(path)?;
                        config.default_account = Some(only.clone());
                        config.save(path)?;
                        info!(account = %only, path = %path.display(), "Saved default account");
                        println!("{}", format_success(&format!("Default account set to {}", only)));
                    }
                    None => debug!("Config file disabled, default account not saved"),
                }
            }
        }
        AuthCommands::Status => {
            let sources = CredentialSources {
                env_file: Some(env_file.to_path_buf()),
                ..Default::default()
            };
            let credentials = sources.resolve()?;
            let client = BraleClient::connect(settings, &credentials).await?;
            let accounts = client.list_accounts().await?;
            println!(
                "{}",
                format_success(&format!(
                    "Token acquired, {} account(s) reachable",
                    accounts.accounts.len()
                ))
            );
        }
    }

    Ok(())
}

/// Handle account commands
pub async fn handle_accounts(
    client: &BraleClient,
    command: AccountCommands,
    default_account: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        AccountCommands::List => {
            let accounts = client.list_accounts().await?;
            println!(
                "{}",
                format::format_accounts(&accounts, default_account, format)?
            );
        }
        AccountCommands::Show { id } => {
            let accounts = client.list_accounts().await?;
            if !accounts.accounts.iter().any(|a| *a == id) {
                return Err(BraleError::resource_failed(format!("Account {} not found", id)).into());
            }
            let is_default = default_account == Some(id.as_str());
            println!("{}", format::format_account(&id, is_default, format)?);
        }
    }

    Ok(())
}

/// Handle address commands
pub async fn handle_addresses(
    client: &BraleClient,
    command: AddressCommands,
    default_account: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        AddressCommands::List { account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let addresses = client.list_addresses(&account).await?;
            println!("{}", format::format_addresses(&addresses, format)?);
        }
        AddressCommands::Show { id, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let address = client.get_address(&account, &id).await?;
            println!("{}", format::format_address(&address, format)?);
        }
    }

    Ok(())
}

/// Handle transfer commands
pub async fn handle_transfers(
    client: &BraleClient,
    command: TransferCommands,
    default_account: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        TransferCommands::Create {
            from,
            to,
            network,
            amount,
            account,
        } => {
            validate_amount(&amount)?;
            if to.trim().is_empty() {
                return Err(BraleError::InvalidInput("Token cannot be empty".to_string()).into());
            }
            let account = resolve_account(account.account.as_deref(), default_account)?;

            let addresses = client.list_addresses(&account).await?;
            let (address_id, network) = select_destination(&addresses, network.as_deref())?;
            info!(address_id = %address_id, network = %network, "Selected destination");

            let request =
                CreateTransferRequest::new(&amount, from.into(), to.trim(), &network, &address_id);
            let transfer = client
                .create_transfer(&account, &request)
                .await
                .context("Failed to create transfer")?;

            match format {
                OutputFormat::Table => {
                    println!(
                        "{}",
                        format_success(&format!(
                            "Created transfer {} ({} USD → {} on {})",
                            transfer.id,
                            amount.trim(),
                            to.trim().to_uppercase(),
                            network
                        ))
                    );
                    println!("{}", format::format_transfer(&transfer, format)?);
                    if transfer.wire_instructions.is_some() || transfer.ach_instructions.is_some() {
                        println!();
                        println!(
                            "{}",
                            format::format_instructions(
                                transfer.wire_instructions.as_ref(),
                                transfer.ach_instructions.as_ref(),
                                format
                            )?
                        );
                    }
                }
                _ => println!("{}", format::format_transfer(&transfer, format)?),
            }
        }
        TransferCommands::List { status, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let transfers = client.list_transfers(&account).await?.transfers;
            let transfers = filter_by_status(transfers, status.as_deref(), |t| t.status.as_str());
            println!("{}", format::format_transfers(&transfers, format)?);
        }
        TransferCommands::Show { id, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let transfer = client.get_transfer(&account, &id).await?;
            println!("{}", format::format_transfer(&transfer, format)?);
        }
        TransferCommands::Instructions { id, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let transfer = client.get_transfer(&account, &id).await?;
            if transfer.wire_instructions.is_none() && transfer.ach_instructions.is_none() {
                return Err(BraleError::resource_failed(format!(
                    "Transfer {} has no funding instructions",
                    id
                ))
                .into());
            }
            println!(
                "{}",
                format::format_instructions(
                    transfer.wire_instructions.as_ref(),
                    transfer.ach_instructions.as_ref(),
                    format
                )?
            );
        }
    }

    Ok(())
}

/// Handle automation commands
pub async fn handle_automations(
    client: &BraleClient,
    command: AutomationCommands,
    default_account: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        AutomationCommands::Create {
            name,
            token,
            network,
            account,
        } => {
            if name.trim().is_empty() {
                return Err(
                    BraleError::InvalidInput("Automation name cannot be empty".to_string()).into(),
                );
            }
            let account = resolve_account(account.account.as_deref(), default_account)?;

            let addresses = client.list_addresses(&account).await?;
            let (address_id, network) = select_destination(&addresses, network.as_deref())?;

            let request =
                CreateAutomationRequest::new(name.trim(), token.trim(), &network, &address_id);
            let automation = client
                .create_automation(&account, &request)
                .await
                .context("Failed to create automation")?;

            if format == OutputFormat::Table {
                println!(
                    "{}",
                    format_success(&format!("Created automation {}", automation.id))
                );
            }
            println!("{}", format::format_automation(&automation, format)?);
        }
        AutomationCommands::List { status, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let automations = client.list_automations(&account).await?.automations;
            let automations = filter_by_status(automations, status.as_deref(), |a| a.status.as_str());
            println!("{}", format::format_automations(&automations, format)?);
        }
        AutomationCommands::Show { id, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let automation = client.get_automation(&account, &id).await?;
            println!("{}", format::format_automation(&automation, format)?);
        }
        AutomationCommands::Instructions { id, account } => {
            let account = resolve_account(account.account.as_deref(), default_account)?;
            let automation = client.get_automation(&account, &id).await?;
            let wire = automation.wire_instructions.as_ref().ok_or_else(|| {
                BraleError::resource_failed(format!("Automation {} has no wire instructions", id))
            })?;
            println!("{}", format::format_instructions(Some(wire), None, format)?);
        }
    }

    Ok(())
}

/// Handle config commands
///
/// `show` and `get` report the effective configuration; `set` and `reset`
/// rewrite the file at `config_path`.
pub fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!(
                "{}",
                format::format_config(current_config, config_path, format)?
            );
        }
        ConfigCommands::Get { key } => match current_config.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!(),
        },
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load(config_path)?;
            config.set(&key, &value)?;
            config.save(config_path)?;
            println!("{}", format_success(&format!("Set {} = {}", key, value)));
        }
        ConfigCommands::Reset => {
            CliConfig::default().save(config_path)?;
            println!("{}", format_success("Configuration reset to defaults"));
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
