//! `fields` command: list the updatable fields of a module

pub mod handler;

pub use handler::handle_fields_command;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct FieldsArgs {
    /// Module to inspect (overrides settings)
    #[arg(long)]
    pub module: Option<String>,

    /// Only show picklist fields
    #[arg(long)]
    pub picklists: bool,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}
