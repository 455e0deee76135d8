//! Command-line interface

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::{CredentialSet, PartialCredentials, ResilienceConfig, ZohoClient};
use crate::config::{self, Settings};
use commands::{FieldsArgs, StatusesArgs, UpdateArgs, ViewArgs};

#[derive(Parser, Debug)]
#[command(name = "zoho-cli", author, version, about = "Bulk status updates for Zoho CRM records", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Settings file (defaults to <config dir>/zoho-cli/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// OAuth client id (overrides ZOHO_CLIENT_ID)
    #[arg(long, global = true, value_name = "ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (overrides ZOHO_CLIENT_SECRET)
    #[arg(long, global = true, value_name = "SECRET")]
    pub client_secret: Option<String>,

    /// OAuth refresh token (overrides ZOHO_REFRESH_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub refresh_token: Option<String>,

    /// API base URL (overrides ZOHO_API_DOMAIN)
    #[arg(long, global = true, value_name = "URL")]
    pub api_domain: Option<String>,

    /// Token endpoint (overrides ZOHO_ACCOUNTS_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub accounts_url: Option<String>,
}

impl GlobalArgs {
    pub fn credential_overrides(&self) -> PartialCredentials {
        PartialCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
            api_domain: self.api_domain.clone(),
            accounts_url: self.accounts_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set a field (Lead_Status by default) on many records
    Update(UpdateArgs),
    /// List the records of a custom view
    View(ViewArgs),
    /// List the updatable fields of a module
    Fields(FieldsArgs),
    /// List the allowed status values
    Statuses(StatusesArgs),
}

/// Everything a command needs: settings, resolved credentials and a client
pub struct AppContext {
    pub settings: Settings,
    pub credentials: CredentialSet,
    pub client: ZohoClient,
}

impl AppContext {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let settings = Settings::load(global.config.as_deref())?;
        let credentials =
            CredentialSet::resolve(&global.credential_overrides(), &config::env_credentials());
        let client = ZohoClient::new(ResilienceConfig::from_settings(&settings))
            .context("Failed to create HTTP client")?;

        Ok(Self {
            settings,
            credentials,
            client,
        })
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.global.no_color {
        colored::control::set_override(false);
    }

    let ctx = AppContext::load(&cli.global)?;

    match cli.command {
        Commands::Update(args) => commands::update::handle_update_command(args, &ctx).await,
        Commands::View(args) => commands::view::handle_view_command(args, &ctx).await,
        Commands::Fields(args) => commands::fields::handle_fields_command(args, &ctx).await,
        Commands::Statuses(args) => commands::statuses::handle_statuses_command(args, &ctx).await,
    }
}
