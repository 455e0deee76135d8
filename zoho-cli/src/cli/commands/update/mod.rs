//! `update` command: set a status on many records

pub mod handler;

pub use handler::handle_update_command;

use clap::{ArgGroup, Args};
use std::path::PathBuf;

use crate::cli::output::OutputFormat;

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["ids", "file", "view"])))]
pub struct UpdateArgs {
    /// Target value for every record (not needed for an id/status table)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Record ids, comma separated or repeated
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ids: Vec<String>,

    /// File with one id per line, or a CSV with id and status columns
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Update every record of this custom view
    #[arg(long, value_name = "CVID")]
    pub view: Option<String>,

    /// Records per write request (1-100)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Module to update (overrides settings)
    #[arg(long)]
    pub module: Option<String>,

    /// API name of the field to set (overrides settings)
    #[arg(long)]
    pub field: Option<String>,

    /// Where to write the failed records CSV
    #[arg(long, value_name = "PATH")]
    pub failures_out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
