//! CLI command and subcommand definitions

use brale_core::TransferSource;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Brale API CLI
#[derive(Parser, Debug)]
#[command(name = "bralectl")]
#[command(version, about = "Command-line client for the Brale API", long_about = None)]
pub struct Cli {
    /// API base URL (overrides config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Authorization server base URL (overrides config file)
    #[arg(long, global = true)]
    pub auth_url: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in seconds (overrides config file)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Extra attempts for transient failures (overrides config file)
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/brale/cli.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment file holding BRALE_CLIENT_ID and BRALE_SECRET (default: .env)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Yaml => crate::format::OutputFormat::Yaml,
        }
    }
}

/// Fiat rail accepted by `transfers create --from`
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SourceArg {
    Wire,
    Ach,
}

impl From<SourceArg> for TransferSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Wire => TransferSource::Wire,
            SourceArg::Ach => TransferSource::Ach,
        }
    }
}

/// Account selection shared by account-scoped commands
#[derive(Args, Debug, Clone, Default)]
pub struct AccountArg {
    /// Account ID (default: configured default_account)
    #[arg(short, long)]
    pub account: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a token, resolve the first account and print its addresses verbatim
    ///
    /// The response body is written unchanged, followed by a newline when it
    /// does not already end with one.
    Walk,

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Account commands
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Address commands
    Addresses {
        #[command(subcommand)]
        command: AddressCommands,
    },

    /// Transfer commands
    Transfers {
        #[command(subcommand)]
        command: TransferCommands,
    },

    /// Automation commands
    Automations {
        #[command(subcommand)]
        command: AutomationCommands,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Whether the command talks to the API and therefore needs credentials.
    pub fn needs_client(&self) -> bool {
        !matches!(
            self,
            Commands::Walk | Commands::Auth { .. } | Commands::Config { .. } | Commands::Completion { .. }
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Verify credentials and remember the account when there is only one
    Login {
        /// OAuth2 client id (default: BRALE_CLIENT_ID)
        #[arg(long)]
        client_id: Option<String>,

        /// OAuth2 client secret (default: BRALE_SECRET)
        #[arg(long)]
        client_secret: Option<String>,
    },

    /// Check that the credentials can reach the API
    Status,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List accounts
    List,

    /// Show a single account
    Show {
        /// Account ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddressCommands {
    /// List addresses of an account
    List {
        #[command(flatten)]
        account: AccountArg,
    },

    /// Show a single address
    Show {
        /// Address ID
        id: String,

        #[command(flatten)]
        account: AccountArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransferCommands {
    /// Create a transfer from a fiat rail to a token address
    Create {
        /// Funding rail
        #[arg(long, value_enum)]
        from: SourceArg,

        /// Token to receive (e.g. SBC, USDC)
        #[arg(long)]
        to: String,

        /// Destination network (default: first network of the first active address)
        #[arg(long)]
        network: Option<String>,

        /// Amount in USD (e.g. 10 or 25.50)
        #[arg(long)]
        amount: String,

        #[command(flatten)]
        account: AccountArg,
    },

    /// List transfers
    List {
        /// Only show transfers with this status
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        account: AccountArg,
    },

    /// Show a single transfer
    Show {
        /// Transfer ID
        id: String,

        #[command(flatten)]
        account: AccountArg,
    },

    /// Show funding instructions for a transfer
    Instructions {
        /// Transfer ID
        id: String,

        #[command(flatten)]
        account: AccountArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum AutomationCommands {
    /// Create an automation funding a token address
    Create {
        /// Automation name
        name: String,

        /// Token to receive (e.g. SBC, USDC)
        #[arg(long)]
        token: String,

        /// Destination network (default: first network of the first active address)
        #[arg(long)]
        network: Option<String>,

        #[command(flatten)]
        account: AccountArg,
    },

    /// List automations
    List {
        /// Only show automations with this status
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        account: AccountArg,
    },

    /// Show a single automation
    Show {
        /// Automation ID
        id: String,

        #[command(flatten)]
        account: AccountArg,
    },

    /// Show wire instructions for an automation
    Instructions {
        /// Automation ID
        id: String,

        #[command(flatten)]
        account: AccountArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print a single setting
    Get {
        /// Setting name (e.g. default_account)
        key: String,
    },

    /// Update a single setting in the config file
    Set {
        /// Setting name
        key: String,

        /// New value (empty clears default_account)
        value: String,
    },

    /// Restore the default configuration
    Reset,
}
