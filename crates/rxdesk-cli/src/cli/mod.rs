//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rxdesk_core::api::resources::Resource;
use rxdesk_core::config::{self, Config};
use rxdesk_core::{ApiClient, FileSessionStore, logging};
use rxdesk_types::wire::{OrderStatus, PrescriptionDecision};

mod commands;

#[derive(Parser)]
#[command(name = "rxdesk")]
#[command(version)]
#[command(about = "Pharmacy ordering API client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "RXDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// List a collection (products, orders, pending-prescriptions, ...)
    List {
        #[arg(value_name = "RESOURCE")]
        resource: Resource,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// Render arrays of records as a table
        #[arg(long)]
        table: bool,
    },

    /// Show one record
    Show {
        #[arg(value_name = "RESOURCE")]
        resource: Resource,

        #[arg(value_name = "ID")]
        id: u64,
    },

    /// List the batches of a product
    Batches {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: u64,

        /// Only unexpired batches with stock
        #[arg(long)]
        active: bool,

        #[arg(long)]
        table: bool,
    },

    /// Change an order's status
    OrderStatus {
        #[arg(value_name = "ORDER_ID")]
        order_id: u64,

        /// Pending, Processing, Completed or Cancelled
        #[arg(value_name = "STATUS")]
        status: OrderStatus,
    },

    /// Approve or reject a prescription
    Verify {
        #[arg(value_name = "PRESCRIPTION_ID")]
        prescription_id: u64,

        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,

        #[arg(long)]
        reject: bool,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Send a raw request through the authenticated client
    Api {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        #[arg(value_name = "METHOD", value_parser = parse_method)]
        method: reqwest::Method,

        /// Path relative to the API base (e.g. /products/)
        #[arg(value_name = "PATH")]
        path: String,

        /// JSON request body
        #[arg(short, long, value_name = "JSON")]
        data: Option<String>,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_method(s: &str) -> Result<reqwest::Method, String> {
    reqwest::Method::from_bytes(s.to_ascii_uppercase().as_bytes())
        .map_err(|_invalid| format!("invalid HTTP method '{s}'"))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(&config);

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, &config).await })
}

fn build_client(config: &Config, api_url: Option<&str>) -> Result<ApiClient> {
    let base_url = match api_url {
        Some(url) => config::resolve_base_url(Some(url), None)?,
        None => config.api_base_url()?,
    };
    let store = Arc::new(FileSessionStore::default_location());
    let client = ApiClient::with_timeout(base_url, store, config.timeout())
        .context("create HTTP client")?;
    tracing::debug!(base_url = %client.base_url(), "api client ready");
    Ok(client)
}

async fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let Cli { command, api_url } = cli;
    let client = || build_client(config, api_url.as_deref());

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },

        Commands::Login { username, password } => {
            commands::auth::login(&client()?, &username, &password).await
        }
        Commands::Logout => commands::auth::logout(&client()?).await,
        Commands::Whoami => commands::auth::whoami(&client()?),
        Commands::Refresh => commands::auth::refresh(&client()?).await,

        Commands::List {
            resource,
            query,
            table,
        } => commands::resources::list(&client()?, resource, &query, table).await,
        Commands::Show { resource, id } => {
            commands::resources::show(&client()?, resource, id).await
        }
        Commands::Batches {
            product_id,
            active,
            table,
        } => commands::resources::batches(&client()?, product_id, active, table).await,
        Commands::OrderStatus { order_id, status } => {
            commands::resources::order_status(&client()?, order_id, status).await
        }
        Commands::Verify {
            prescription_id,
            approve,
            reject: _,
            notes,
        } => {
            let decision = if approve {
                PrescriptionDecision::Approved
            } else {
                PrescriptionDecision::Rejected
            };
            commands::resources::verify(&client()?, prescription_id, decision, &notes).await
        }

        Commands::Api {
            method,
            path,
            data,
            query,
        } => commands::api::raw(&client()?, method, &path, data.as_deref(), query).await,
    }
}
