//! hubspot-connect - connect a HubSpot account from the terminal
//!
//! Plays the host application around the connect flow: owns the integration
//! parameters, opens the system browser as the authorization popup and shows
//! the resulting state.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hubspot_connect::api::ContactsClient;
use hubspot_connect::connect::{ButtonView, TerminalNotifier};
use hubspot_connect::popup::BrowserOpener;
use hubspot_connect::{
    Config, ConnectController, ConnectOutcome, ConnectionStatus, HttpBackend, Identity,
    IntegrationParams, IntegrationProfile, IntegrationStore, MemoryStore,
};

#[derive(Parser)]
#[command(name = "hubspot-connect")]
#[command(about = "Connect a HubSpot account through the integrations backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Integrations backend base URL (overrides config)
    #[arg(long, global = true)]
    backend: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the authorization handshake for a user/org pair
    Connect {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Organization identifier
        #[arg(short, long)]
        org: String,

        /// Current integration parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Show the connect button state for integration parameters
    Status {
        /// Integration parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },

    /// List HubSpot contacts using connected credentials
    Contacts {
        /// Credentials payload (JSON) returned by `connect`
        #[arg(short, long)]
        credentials: String,
    },

    /// Show configuration path and effective values
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = Config::load()?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }

    match cli.command {
        Commands::Connect { user, org, params } => {
            connect(&config, Identity::new(user, org), parse_params(params)?).await?;
        }
        Commands::Status { params } => {
            status(&config, &parse_params(params)?);
        }
        Commands::Contacts { credentials } => {
            contacts(&config, &credentials).await?;
        }
        Commands::Config { init } => {
            show_config(&config, init)?;
        }
    }

    Ok(())
}

fn parse_params(params: Option<String>) -> Result<IntegrationParams> {
    match params {
        Some(json) => {
            IntegrationParams::from_json(&json)
                .context("Integration parameters must be a JSON object")
        }
        None => Ok(IntegrationParams::new()),
    }
}

async fn connect(config: &Config, identity: Identity, params: IntegrationParams) -> Result<()> {
    let backend = HttpBackend::new(&config.backend_url, &config.provider)
        .context("Invalid backend URL")?;
    let store = Arc::new(MemoryStore::new(params));
    let controller = ConnectController::new(
        identity,
        IntegrationProfile::from(config),
        Arc::new(backend),
        Arc::new(BrowserOpener::new()),
        store.clone(),
        Arc::new(TerminalNotifier),
    );

    println!("{}", controller.button());

    let changes = store.subscribe();
    let outcome = tokio::select! {
        outcome = controller.connect() => outcome,
        _ = controller.follow(changes) => bail!("Integration store closed during handshake"),
    };

    match outcome? {
        ConnectOutcome::Skipped => {
            println!("Already connected. Nothing to do.");
        }
        ConnectOutcome::NotYetAuthorized => {
            println!("No credentials yet. Authorize in the browser, then run connect again.");
        }
        ConnectOutcome::Connected(_) => {
            println!("{} account connected.", config.display_name);
        }
    }

    println!("{}", controller.button());
    println!(
        "{}",
        serde_json::to_string_pretty(&store.current()).context("Failed to serialize params")?
    );
    Ok(())
}

fn status(config: &Config, params: &IntegrationParams) {
    let connected = params.is_connected_to(&config.integration_type);
    let status = ConnectionStatus::from_flags(connected, false);

    println!("Status: {}", status);
    println!("{}", ButtonView::for_status(status, &config.display_name));
}

async fn contacts(config: &Config, credentials: &str) -> Result<()> {
    // Raw token strings are passed through; the loader reports what is missing
    let credentials: Value = serde_json::from_str(credentials)
        .unwrap_or_else(|_| Value::String(credentials.to_string()));

    let client = ContactsClient::new(&config.hubspot_api_url)?;
    let items = client.list_contacts(&credentials).await?;

    println!();
    for item in &items {
        println!(
            "{:<24} {:<32} {}",
            item.id.as_deref().unwrap_or("(none)"),
            item.name,
            item.item_type
        );
    }
    println!("\n{} contact(s)", items.len());
    Ok(())
}

fn show_config(config: &Config, init: bool) -> Result<()> {
    let path = Config::config_path()?;
    if init && !path.exists() {
        Config::default().save()?;
        println!("Wrote default config.");
    }

    println!("Config file: {}", path.display());
    println!();
    print!(
        "{}",
        toml::to_string_pretty(config).context("Failed to serialize config")?
    );
    Ok(())
}
