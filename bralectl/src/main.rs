//! Brale CLI
//!
//! Command-line client for the Brale API.

use anyhow::Result;
use brale_core::{default_env_file_path, BraleError, CredentialSources};
use bralectl::cli::{
    generate_completion, handle_accounts, handle_addresses, handle_auth, handle_automations,
    handle_config, handle_transfers, handle_walk, Cli, Commands,
};
use bralectl::client::{BraleClient, ClientSettings};
use bralectl::config::CliConfig;
use bralectl::format::OutputFormat;
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Build configuration using priority chain: defaults → file → env → CLI args
    let (config, config_path) = match build_config(&cli) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(2);
        }
    };

    init_tracing(config.verbose);
    debug!(
        api_url = %config.api_base_url,
        auth_url = %config.auth_base_url,
        format = %config.output_format,
        config_file = %config_path.display(),
        "Configuration loaded"
    );

    if let Err(e) = run(cli, &config, &config_path).await {
        eprintln!("Error: {:#}", e);
        if config.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn build_config(cli: &Cli) -> Result<(CliConfig, std::path::PathBuf)> {
    let mut builder = CliConfig::builder();

    if let Some(ref path) = cli.config {
        builder = builder.with_config_path(path);
    }
    let config_path = builder.config_path();

    // Load config file (unless --no-config is specified)
    builder = builder.with_config_file(!cli.no_config)?;

    // Apply environment variable overrides
    builder = builder.with_env_overrides();

    // Apply CLI argument overrides (highest priority)
    if let Some(ref url) = cli.api_url {
        builder = builder.with_api_base_url(url)?;
    }
    if let Some(ref url) = cli.auth_url {
        builder = builder.with_auth_base_url(url)?;
    }
    if let Some(format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_timeout(timeout)?;
    }
    if let Some(retries) = cli.max_retries {
        builder = builder.with_max_retries(retries)?;
    }

    Ok((builder.build()?, config_path))
}

async fn run(cli: Cli, config: &CliConfig, config_path: &std::path::Path) -> Result<()> {
    let settings = ClientSettings::from_config(config);
    let format = OutputFormat::from_name(&config.output_format);
    let default_account = config.default_account.as_deref();
    let env_file = cli.env_file.unwrap_or_else(default_env_file_path);

    let client = if cli.command.needs_client() {
        let credentials = CredentialSources {
            env_file: Some(env_file.clone()),
            ..Default::default()
        }
        .resolve()?;
        Some(BraleClient::connect(&settings, &credentials).await?)
    } else {
        None
    };

    match (cli.command, client) {
        (Commands::Walk, _) => handle_walk(&settings, &env_file).await,
        (Commands::Auth { command }, _) => {
            let persist = (!cli.no_config).then_some(config_path);
            handle_auth(command, &settings, &env_file, persist).await
        }
        (Commands::Config { command }, _) => handle_config(command, config, config_path, format),
        (Commands::Completion { shell }, _) => {
            generate_completion(shell);
            Ok(())
        }
        (Commands::Accounts { command }, Some(client)) => {
            handle_accounts(&client, command, default_account, format).await
        }
        (Commands::Addresses { command }, Some(client)) => {
            handle_addresses(&client, command, default_account, format).await
        }
        (Commands::Transfers { command }, Some(client)) => {
            handle_transfers(&client, command, default_account, format).await
        }
        (Commands::Automations { command }, Some(client)) => {
            handle_automations(&client, command, default_account, format).await
        }
        (_, None) => Err(anyhow::anyhow!("Command requires an authenticated client")),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bralectl=debug,brale_core=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Exit status for a failed command, taken from the first `BraleError` in the
/// error chain.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BraleError>())
        .map_or(1, BraleError::exit_code)
}
