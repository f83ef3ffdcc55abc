//! Output formatting utilities for the CLI
//!
//! Provides table, JSON and YAML formatting with colors.

use crate::config::CliConfig;
use anyhow::Result;
use brale_core::api::{
    AccountsResponse, AchInstructions, Address, AddressesResponse, Automation, Transfer,
    WireInstructions,
};
use colored::*;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Longest id or address shown in a table cell before truncation
const MAX_CELL_WIDTH: usize = 20;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse a format name as stored in the config file, defaulting to table.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Table,
        }
    }
}

/// Serialize `value` for the structured formats.
fn structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
        OutputFormat::Table => Ok(None),
    }
}

/// Shorten long identifiers for table cells, keeping both ends.
pub fn truncate_middle(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max || max < 5 {
        return value.to_string();
    }
    let keep = (max - 3) / 2;
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}...{}", head, tail)
}

fn colored_status(status: &str) -> String {
    match status {
        "active" | "complete" | "completed" => status.green().to_string(),
        "pending" | "processing" => status.yellow().to_string(),
        "failed" | "canceled" | "cancelled" => status.red().to_string(),
        _ => status.to_string(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn push_field(output: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        output.push('\n');
        output.push_str(&format!("{}: {}", label, value.cyan()));
    }
}

/// Format the account list, marking the default account
pub fn format_accounts(
    accounts: &AccountsResponse,
    default_account: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    if let Some(output) = structured(accounts, format)? {
        return Ok(output);
    }

    #[derive(Tabled)]
    struct AccountRow {
        #[tabled(rename = "Account ID")]
        id: String,
        #[tabled(rename = "Default")]
        default: String,
    }

    if accounts.accounts.is_empty() {
        return Ok("No accounts found".yellow().to_string());
    }

    let rows: Vec<AccountRow> = accounts
        .accounts
        .iter()
        .map(|id| AccountRow {
            id: id.cyan().to_string(),
            default: if Some(id.as_str()) == default_account {
                "✓".green().to_string()
            } else {
                String::new()
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", "Accounts:".bold(), table))
}

/// Format a single account
pub fn format_account(id: &str, is_default: bool, format: OutputFormat) -> Result<String> {
    #[derive(Serialize)]
    struct AccountView<'a> {
        id: &'a str,
        default: bool,
    }

    let view = AccountView {
        id,
        default: is_default,
    };
    if let Some(output) = structured(&view, format)? {
        return Ok(output);
    }

    Ok(format!(
        "{}\nID: {}\nDefault: {}",
        "Account".bold(),
        id.cyan(),
        if is_default { "Yes".green() } else { "No".normal() }
    ))
}

/// Format the address list
pub fn format_addresses(addresses: &AddressesResponse, format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(addresses, format)? {
        return Ok(output);
    }

    #[derive(Tabled)]
    struct AddressRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Type")]
        address_type: String,
        #[tabled(rename = "Address")]
        address: String,
        #[tabled(rename = "Networks")]
        networks: String,
    }

    if addresses.addresses.is_empty() {
        return Ok("No addresses found".yellow().to_string());
    }

    let rows: Vec<AddressRow> = addresses
        .addresses
        .iter()
        .map(|addr| AddressRow {
            id: truncate_middle(&addr.id, MAX_CELL_WIDTH),
            status: colored_status(&addr.status),
            address_type: addr.address_type.clone(),
            address: addr
                .address
                .as_deref()
                .map(|a| truncate_middle(a, MAX_CELL_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
            networks: addr.transfer_types.join(", "),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", "Addresses:".bold(), table))
}

/// Format a single address with all its fields
pub fn format_address(address: &Address, format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(address, format)? {
        return Ok(output);
    }

    let mut output = format!("{}\nID: {}", "Address".bold(), address.id.cyan());
    output.push_str(&format!("\nStatus: {}", colored_status(&address.status)));
    output.push_str(&format!("\nType: {}", address.address_type));
    push_field(&mut output, "Name", address.name.as_deref());
    push_field(&mut output, "Address", address.address.as_deref());
    push_field(&mut output, "Created", address.created.as_deref());
    output.push_str(&format!(
        "\nNetworks: {}",
        if address.transfer_types.is_empty() {
            "-".to_string()
        } else {
            address.transfer_types.join(", ")
        }
    ));
    Ok(output)
}

fn transfer_amount(transfer: &Transfer) -> String {
    transfer
        .amount
        .as_ref()
        .map(|a| format!("{} {}", a.value, a.currency))
        .unwrap_or_else(|| "-".to_string())
}

fn transfer_route(transfer: &Transfer) -> String {
    let from = transfer
        .source
        .as_ref()
        .map(|s| s.transfer_type.as_str())
        .unwrap_or("?");
    let to = transfer
        .destination
        .as_ref()
        .map(|d| format!("{} on {}", d.value_type, d.transfer_type))
        .unwrap_or_else(|| "?".to_string());
    format!("{} → {}", from, to)
}

/// Format a transfer list
pub fn format_transfers(transfers: &[Transfer], format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(&transfers, format)? {
        return Ok(output);
    }

    #[derive(Tabled)]
    struct TransferRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Route")]
        route: String,
        #[tabled(rename = "Created")]
        created: String,
    }

    if transfers.is_empty() {
        return Ok("No transfers found".yellow().to_string());
    }

    let rows: Vec<TransferRow> = transfers
        .iter()
        .map(|t| TransferRow {
            id: truncate_middle(&t.id, MAX_CELL_WIDTH),
            status: colored_status(&t.status),
            amount: transfer_amount(t),
            route: transfer_route(t),
            created: or_dash(t.created_at.as_deref()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", "Transfers:".bold(), table))
}

/// Format a single transfer
pub fn format_transfer(transfer: &Transfer, format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(transfer, format)? {
        return Ok(output);
    }

    let mut output = format!("{}\nID: {}", "Transfer".bold(), transfer.id.cyan());
    output.push_str(&format!("\nStatus: {}", colored_status(&transfer.status)));
    output.push_str(&format!("\nAmount: {}", transfer_amount(transfer)));
    output.push_str(&format!("\nRoute: {}", transfer_route(transfer)));
    if let Some(address_id) = transfer
        .destination
        .as_ref()
        .and_then(|d| d.address_id.as_deref())
    {
        output.push_str(&format!("\nDestination address: {}", address_id));
    }
    push_field(&mut output, "Created", transfer.created_at.as_deref());
    push_field(&mut output, "Updated", transfer.updated_at.as_deref());
    push_field(&mut output, "Note", transfer.note.as_deref());
    Ok(output)
}

/// Format funding instructions
pub fn format_instructions(
    wire: Option<&WireInstructions>,
    ach: Option<&AchInstructions>,
    format: OutputFormat,
) -> Result<String> {
    #[derive(Serialize)]
    struct InstructionsView<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        wire_instructions: Option<&'a WireInstructions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ach_instructions: Option<&'a AchInstructions>,
    }

    let view = InstructionsView {
        wire_instructions: wire,
        ach_instructions: ach,
    };
    if let Some(output) = structured(&view, format)? {
        return Ok(output);
    }

    let mut sections = Vec::new();

    if let Some(wire) = wire {
        let mut output = "Wire Instructions".bold().to_string();
        push_field(&mut output, "Bank", wire.bank_name.as_deref());
        push_field(&mut output, "Bank address", wire.bank_address.as_deref());
        push_field(&mut output, "Account number", wire.account_number.as_deref());
        push_field(&mut output, "Routing number", wire.routing_number.as_deref());
        push_field(&mut output, "Beneficiary", wire.beneficiary_name.as_deref());
        push_field(
            &mut output,
            "Beneficiary address",
            wire.beneficiary_address.as_deref(),
        );
        if let Some(memo) = wire.memo.as_deref() {
            output.push_str(&format!("\nMemo: {} {}", memo.yellow().bold(), "(required)".dimmed()));
        }
        sections.push(output);
    }

    if let Some(ach) = ach {
        let mut output = "ACH Instructions".bold().to_string();
        push_field(&mut output, "Account name", ach.account_name.as_deref());
        push_field(&mut output, "Account number", ach.account_number.as_deref());
        push_field(&mut output, "Routing number", ach.routing_number.as_deref());
        sections.push(output);
    }

    Ok(sections.join("\n\n"))
}

fn automation_target(automation: &Automation) -> String {
    automation
        .destination
        .as_ref()
        .map(|d| format!("{} on {}", d.value_type, d.transfer_type))
        .unwrap_or_else(|| "-".to_string())
}

/// Format an automation list
pub fn format_automations(automations: &[Automation], format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(&automations, format)? {
        return Ok(output);
    }

    #[derive(Tabled)]
    struct AutomationRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Destination")]
        destination: String,
    }

    if automations.is_empty() {
        return Ok("No automations found".yellow().to_string());
    }

    let rows: Vec<AutomationRow> = automations
        .iter()
        .map(|a| AutomationRow {
            id: truncate_middle(&a.id, MAX_CELL_WIDTH),
            name: or_dash(a.name.as_deref()),
            status: colored_status(&a.status),
            destination: automation_target(a),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", "Automations:".bold(), table))
}

/// Format a single automation
pub fn format_automation(automation: &Automation, format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(automation, format)? {
        return Ok(output);
    }

    let mut output = format!("{}\nID: {}", "Automation".bold(), automation.id.cyan());
    push_field(&mut output, "Name", automation.name.as_deref());
    output.push_str(&format!("\nStatus: {}", colored_status(&automation.status)));
    output.push_str(&format!("\nDestination: {}", automation_target(automation)));
    push_field(&mut output, "Created", automation.created_at.as_deref());
    push_field(&mut output, "Updated", automation.updated_at.as_deref());
    Ok(output)
}

/// Format the effective CLI configuration
pub fn format_config(config: &CliConfig, path: &Path, format: OutputFormat) -> Result<String> {
    if let Some(output) = structured(config, format)? {
        return Ok(output);
    }

    let mut output = "CLI Configuration".bold().to_string();
    output.push_str(&format!("\nConfig file: {}", path.display().to_string().dimmed()));
    output.push_str(&format!("\nAPI URL: {}", config.api_base_url.cyan()));
    output.push_str(&format!("\nAuth URL: {}", config.auth_base_url.cyan()));
    output.push_str(&format!(
        "\nDefault account: {}",
        config
            .default_account
            .as_deref()
            .map(|a| a.cyan().to_string())
            .unwrap_or_else(|| "(none)".dimmed().to_string())
    ));
    output.push_str(&format!("\nOutput format: {}", config.output_format.cyan()));
    output.push_str(&format!(
        "\nVerbose: {}",
        if config.verbose { "Yes".green() } else { "No".normal() }
    ));
    output.push_str(&format!("\nTimeout: {}s", config.timeout.to_string().yellow()));
    output.push_str(&format!(
        "\nMax retries: {}",
        config.max_retries.to_string().yellow()
    ));
    Ok(output)
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
