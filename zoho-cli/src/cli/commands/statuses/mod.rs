//! `statuses` command: show the allowed status values

pub mod handler;

pub use handler::handle_statuses_command;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct StatusesArgs {
    /// Fetch the field's picklist values from Zoho and compare them with the
    /// configured catalog
    #[arg(long)]
    pub remote: bool,

    /// Module to inspect (overrides settings)
    #[arg(long)]
    pub module: Option<String>,

    /// Field API name to inspect (overrides settings)
    #[arg(long)]
    pub field: Option<String>,
}
