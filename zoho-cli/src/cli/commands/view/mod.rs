//! `view` command: list the records of a custom view

pub mod handler;

pub use handler::handle_view_command;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Custom view id (cvid)
    pub view_id: String,

    /// Walk every page instead of only the first
    #[arg(short, long)]
    pub all: bool,

    /// Records per page (1-200, overrides settings)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Module the view belongs to (overrides settings)
    #[arg(long)]
    pub module: Option<String>,

    /// Field API names to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Print only record ids, one per line
    #[arg(long)]
    pub ids_only: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
